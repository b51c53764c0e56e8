use super::*;

#[test]
fn page_paths_are_guarded() {
    assert!(is_guarded("/"));
    assert!(is_guarded("/app/find-work"));
    assert!(is_guarded("/login"));
    assert!(is_guarded("/app/jobs/42"));
}

#[test]
fn api_and_framework_paths_bypass() {
    assert!(!is_guarded("/api/v1/me"));
    assert!(!is_guarded("/_next/static/chunk.js"));
    assert!(!is_guarded("/favicon.ico"));
}

#[test]
fn files_with_extensions_bypass() {
    assert!(!is_guarded("/logo.svg"));
    assert!(!is_guarded("/assets/app.4f2a.css"));
    assert!(!is_guarded("/app/report.pdf"));
}

#[test]
fn dot_anywhere_in_path_bypasses() {
    assert!(!is_guarded("/app/v1.2/settings"));
    assert!(!is_guarded("/.well-known/security"));
}
