//! Own test binary: environment variables are process-wide, so these must not
//! share a process with the other config tests.

use sentiment_client::config::load_config;
use std::io::Write;

#[test]
fn environment_layers_between_file_and_cli() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"api_base_url = \"http://from-file:1\"\n[progress]\nstep = 20\ncap = 80\n")
        .unwrap();

    std::env::set_var("SENTIMENT_PROGRESS__STEP", "5");
    std::env::set_var("SENTIMENT_API_BASE_URL", "http://env:9");

    let from_env = load_config(Some(file.path()), &None);
    let from_cli = load_config(Some(file.path()), &Some("http://cli:3".into()));

    std::env::remove_var("SENTIMENT_PROGRESS__STEP");
    std::env::remove_var("SENTIMENT_API_BASE_URL");

    let cfg = from_env.unwrap();
    assert_eq!(cfg.progress.step, 5);
    assert_eq!(cfg.progress.cap, 80);
    assert_eq!(cfg.api_base_url, "http://env:9");

    assert_eq!(from_cli.unwrap().api_base_url, "http://cli:3");
}
