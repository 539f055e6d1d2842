//! Common test fixtures for ferry testing

use ferry_core::config::{FtpOptions, HttpOptions};
use ferry_core::{AdapterConfig, AdapterOptions};

/// Options with both required hosts set and everything else defaulted
pub fn adapter_options() -> AdapterOptions {
    AdapterOptions {
        ftp: FtpOptions {
            host: Some("ftp.example.com".to_string()),
            ..Default::default()
        },
        http: HttpOptions {
            host: Some("example.com".to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Options scoping files under `/uploads` and publishing them under `/files`
pub fn scoped_options(http_port: u16) -> AdapterOptions {
    let mut options = adapter_options();
    options.ftp.path = Some("/uploads".to_string());
    options.http.path = Some("/files".to_string());
    options.http.port = Some(http_port);
    options
}

/// Resolved configuration for [`scoped_options`] with diagnostics on
pub fn debug_config() -> AdapterConfig {
    let mut options = scoped_options(80);
    options.debug = Some(true);
    AdapterConfig::from_options(options).expect("fixture options are complete")
}

/// A TOML config file with every option spelled out
pub fn full_config_toml() -> &'static str {
    r#"# ferry adapter configuration
debug = true
connect_timeout_ms = 2000

[ftp]
host = "ftp.example.com"
port = 2121
path = "/srv/uploads"
user = "deploy"
password = "hunter2"

[http]
host = "cdn.example.com"
port = 8080
path = "/static"
"#
}

/// Named payloads covering text, binary, empty and multi-chunk content
pub fn payloads() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("hello.txt", b"Hello, ferry!".to_vec()),
        ("empty.bin", Vec::new()),
        ("binary.bin", (0..=255u8).collect()),
        ("nested/dir/notes.md", b"# Notes\n\n- one\n- two\n".to_vec()),
        ("with space & symbols?.txt", "ünïcödé ✓".as_bytes().to_vec()),
        (
            "large.bin",
            (0..256 * 1024).map(|i| (i % 251) as u8).collect(),
        ),
    ]
}
