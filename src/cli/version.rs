//! Version information.

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The line printed for `--version`.
pub fn version_line() -> String {
    format!("colloq {}", VERSION)
}
