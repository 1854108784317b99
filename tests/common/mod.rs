use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use chatai::config::Config;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Default configuration pointed at a mock server
#[allow(dead_code)]
pub fn config_for(base_url: &str) -> Config {
    let mut config = Config::default();
    config.server.base_url = base_url.to_string();
    config.server.timeout_seconds = 5;
    config
}

/// SSE body built from `data:` payloads
#[allow(dead_code)]
pub fn sse_body(payloads: &[&str]) -> String {
    payloads
        .iter()
        .map(|p| format!("data: {}\n\n", p))
        .collect()
}
