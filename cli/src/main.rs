use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use client::api::jobs::{ExperienceLevel, JobType, NewJobRequest, UpdateJobRequest};
use client::api::proposals::{CreateProposalRequest, EditProposalRequest};
use client::api::{self, country};
use client::net::types::{Gender, LoginCredentials, RegisterData};
use client::state::{self, SessionValidity, SwitchError};
use client::{ApiError, ApiGateway, ConfigError, GatewayConfig, Navigator};
use serde::Serialize;
use serde::de::DeserializeOwned;
use session::{FileStorage, GuardDecision, Role, SessionStore};

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Switch(#[from] SwitchError),
    #[error("not signed in; run `login` first")]
    NotSignedIn,
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "market-cli", about = "Freelance marketplace API CLI")]
struct Cli {
    #[arg(long, env = "MARKET_API_BASE_URL", default_value = client::config::DEFAULT_API_BASE_URL)]
    base_url: String,

    /// Directory holding the persisted session.
    #[arg(long, env = "MARKET_SESSION_DIR", default_value = ".marketplace")]
    session_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "MARKET_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register(RegisterArgs),
    Logout,
    /// Verify the stored session against the server and print the user.
    Whoami,
    /// Account contact and verification details.
    Account,
    /// Switch the active role (client or freelancer).
    Switch {
        role: Role,
    },
    /// Show where the route guard would send a visitor on `path`.
    Guard {
        path: String,
    },
    Jobs(JobsCommand),
    Proposals(ProposalsCommand),
    Profiles(ProfilesCommand),
    Countries {
        #[arg(long)]
        country: Option<String>,
    },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "MARKET_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    phone: String,
    #[arg(long, value_parser = parse_wire_enum::<Gender>)]
    gender: Gender,
    /// `YYYY-MM-DD`
    #[arg(long)]
    birth_date: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    timezone: String,
    #[arg(long)]
    role: Role,
}

#[derive(Args, Debug)]
struct JobsCommand {
    #[command(subcommand)]
    command: JobsSubcommand,
}

#[derive(Subcommand, Debug)]
enum JobsSubcommand {
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    Show {
        id: String,
    },
    /// Jobs posted by a client.
    Mine {
        #[arg(long)]
        client_id: String,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        price: f64,
        #[arg(long, value_parser = parse_wire_enum::<ExperienceLevel>, default_value = "any")]
        level: ExperienceLevel,
        #[arg(long = "type", value_parser = parse_wire_enum::<JobType>, default_value = "job")]
        job_type: JobType,
    },
    Update {
        id: String,
        #[arg(long)]
        price: f64,
        #[arg(long, value_parser = parse_wire_enum::<ExperienceLevel>)]
        level: ExperienceLevel,
    },
}

#[derive(Args, Debug)]
struct ProposalsCommand {
    #[command(subcommand)]
    command: ProposalsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProposalsSubcommand {
    Mine,
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        job_id: String,
        #[arg(long)]
        profile_id: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        hours: u32,
        #[arg(long)]
        price: f64,
    },
    Edit {
        id: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        hours: u32,
        #[arg(long)]
        price: f64,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct ProfilesCommand {
    #[command(subcommand)]
    command: ProfilesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfilesSubcommand {
    List,
    /// Report which profiles the account still needs.
    Check {
        #[arg(long, default_value = "/app")]
        path: String,
    },
    Freelancer {
        id: String,
    },
    Client {
        id: String,
    },
    Skills,
    Specializations,
}

/// Prints the redirect the gateway asks for after the session ends.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!(%path, "navigation requested");
        if path == session::LOGIN_PATH {
            eprintln!("session expired; run `login` again");
        } else {
            eprintln!("redirect: {path}");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(error: &CliError) {
    tracing::debug!(error = ?error, "command failed");
    match error {
        CliError::Api(api_error) => {
            eprintln!("error: {}", api_error.user_message());
            for field in api_error.field_errors() {
                eprintln!("  {}: {}", field.field, field.message);
            }
        }
        other => eprintln!("error: {other}"),
    }
}

fn build_gateway(cli: &Cli) -> Result<ApiGateway, CliError> {
    let config = GatewayConfig { timeouts: GatewayConfig::from_env()?.timeouts, ..GatewayConfig::new(&cli.base_url)? };
    let storage = Arc::new(FileStorage::new(cli.session_dir.clone()));
    let session = Arc::new(SessionStore::hydrate(storage));
    Ok(ApiGateway::new(&config, session)?.with_navigator(Arc::new(TerminalNavigator)))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let gateway = build_gateway(&cli)?;

    match cli.command {
        Command::Login { username, password } => {
            state::sign_in(&gateway, &LoginCredentials { username, password }).await?;
            let validity = state::validate_session(&gateway).await;
            print_landing(&gateway, &validity);
            Ok(())
        }
        Command::Register(args) => {
            state::sign_up(&gateway, &register_data(args)).await?;
            println!("registered; signed in");
            Ok(())
        }
        Command::Logout => {
            state::sign_out(gateway.session());
            println!("signed out");
            Ok(())
        }
        Command::Whoami => match state::validate_session(&gateway).await {
            SessionValidity::Valid(user) => print_json(&user),
            SessionValidity::Pending | SessionValidity::Invalid => Err(CliError::NotSignedIn),
        },
        Command::Account => print_json(&api::auth::account_info(&gateway).await?.data),
        Command::Switch { role } => {
            if gateway.session().user().is_none() {
                ensure_signed_in(&gateway).await?;
            }
            let home = state::switch_account(&gateway, role).await?;
            println!("now acting as {}; home: {home}", role.label());
            Ok(())
        }
        Command::Guard { path } => {
            let snapshot = gateway.session().snapshot();
            match session::decide(&path, snapshot.is_authenticated, snapshot.current_role()) {
                GuardDecision::Allow => println!("allow"),
                GuardDecision::Redirect(target) => println!("redirect {target}"),
            }
            Ok(())
        }
        Command::Jobs(jobs) => run_jobs(&gateway, jobs).await,
        Command::Proposals(proposals) => run_proposals(&gateway, proposals).await,
        Command::Profiles(profiles) => run_profiles(&gateway, profiles).await,
        Command::Countries { country } => {
            let map = country::countries(&gateway).await?.data;
            match country {
                Some(name) => print_json(&country::timezones_for(&map, &name)),
                None => print_json(&map),
            }
        }
    }
}

async fn ensure_signed_in(gateway: &ApiGateway) -> Result<(), CliError> {
    match state::validate_session(gateway).await {
        SessionValidity::Valid(_) => Ok(()),
        SessionValidity::Pending | SessionValidity::Invalid => Err(CliError::NotSignedIn),
    }
}

fn print_landing(gateway: &ApiGateway, validity: &SessionValidity) {
    let role = match validity {
        SessionValidity::Valid(user) => {
            println!("signed in as {} <{}>", user.full_name(), user.email);
            Some(user.current_type)
        }
        SessionValidity::Pending | SessionValidity::Invalid => {
            println!("signed in");
            gateway.session().current_role()
        }
    };
    println!("home: {}", session::home_route(role));
}

async fn run_jobs(gateway: &ApiGateway, jobs: JobsCommand) -> Result<(), CliError> {
    match jobs.command {
        JobsSubcommand::List { page } => print_json(&api::jobs::public_jobs(gateway, page).await?.data),
        JobsSubcommand::Show { id } => print_json(&api::jobs::job_by_id(gateway, &id).await?.data),
        JobsSubcommand::Mine { client_id } => print_json(&api::jobs::client_jobs(gateway, &client_id).await?.data),
        JobsSubcommand::Create { title, content, price, level, job_type } => {
            let job = NewJobRequest { title, content, job_price: price, experience_level: level, job_type };
            print_json(&api::jobs::create_job(gateway, &job).await?.data)
        }
        JobsSubcommand::Update { id, price, level } => {
            let update = UpdateJobRequest { id, job_price: price, experience_level: level };
            print_json(&api::jobs::update_job(gateway, &update).await?.data)
        }
    }
}

async fn run_proposals(gateway: &ApiGateway, proposals: ProposalsCommand) -> Result<(), CliError> {
    match proposals.command {
        ProposalsSubcommand::Mine => print_json(&api::proposals::my_proposals(gateway).await?.data),
        ProposalsSubcommand::Show { id } => print_json(&api::proposals::proposal_by_id(gateway, &id).await?.data),
        ProposalsSubcommand::Create { job_id, profile_id, content, hours, price } => {
            let proposal = CreateProposalRequest {
                job_id,
                freelancer_profile_id: profile_id,
                content,
                total_time_hours: hours,
                total_price: price,
            };
            print_json(&api::proposals::create_proposal(gateway, &proposal).await?.data)
        }
        ProposalsSubcommand::Edit { id, content, hours, price } => {
            let edit = EditProposalRequest { content, total_time_hours: hours, total_price: price };
            print_json(&api::proposals::edit_proposal(gateway, &id, &edit).await?.data)
        }
        ProposalsSubcommand::Delete { id } => {
            api::proposals::delete_proposal(gateway, &id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

async fn run_profiles(gateway: &ApiGateway, profiles: ProfilesCommand) -> Result<(), CliError> {
    match profiles.command {
        ProfilesSubcommand::List => print_json(&api::profile::profiles(gateway).await?.data),
        ProfilesSubcommand::Check { path } => {
            if gateway.session().user().is_none() {
                ensure_signed_in(gateway).await?;
            }
            let check = state::check_profiles(gateway).await?;
            match check.redirect_for(&path) {
                Some(route) => println!("profile needed: {route}"),
                None => println!("profiles complete"),
            }
            Ok(())
        }
        ProfilesSubcommand::Freelancer { id } => {
            print_json(&api::profile::freelancer_profile_details(gateway, &id).await?.data)
        }
        ProfilesSubcommand::Client { id } => print_json(&api::profile::client_profile_details(gateway, &id).await?.data),
        ProfilesSubcommand::Skills => print_json(&api::profile::skills(gateway).await?.data),
        ProfilesSubcommand::Specializations => print_json(&api::profile::specializations(gateway).await?.data),
    }
}

fn register_data(args: RegisterArgs) -> RegisterData {
    RegisterData {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        confirm_password: args.password.clone(),
        password: args.password,
        phone_number: args.phone,
        gender: args.gender,
        birth_date: args.birth_date,
        country: args.country,
        timezone: args.timezone,
        personal_photo: None,
        user_type: args.role,
    }
}

/// Parse a kebab- or snake-case flag value into a SCREAMING_SNAKE_CASE wire enum.
fn parse_wire_enum<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let wire = raw.trim().replace('-', "_").to_ascii_uppercase();
    serde_json::from_value(serde_json::Value::String(wire)).map_err(|_| format!("unsupported value `{raw}`"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
