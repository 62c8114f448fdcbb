//! Command-line argument parsing for the colloq binary.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Run the interactive chat (default)
    Run,
}

/// Parse command-line arguments and return the appropriate command.
///
/// The first item is the program name and is skipped. Unknown arguments are
/// ignored.
///
/// # Examples
///
/// ```
/// use colloq::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["colloq".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    for arg in args.skip(1) {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            _ => {}
        }
    }
    CliCommand::Run
}

/// Usage text printed for `--help`.
pub fn usage() -> String {
    format!(
        "colloq {}\n\
         Streaming chat client with persistent conversation threads.\n\n\
         USAGE:\n    colloq [--help | --version]\n\n\
         ENVIRONMENT:\n    \
         COLLOQ_API_URL   Backend base URL (default http://localhost:8000)\n    \
         COLLOQ_DATA_DIR  Where conversations are stored\n    \
         RUST_LOG         Log filter, logs go to stderr (default warn)\n\n\
         Type /help inside the session for commands.",
        super::version::VERSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliCommand {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_version_flags() {
        assert_eq!(parse(&["colloq", "--version"]), CliCommand::Version);
        assert_eq!(parse(&["colloq", "-V"]), CliCommand::Version);
    }

    #[test]
    fn test_parse_help_flags() {
        assert_eq!(parse(&["colloq", "--help"]), CliCommand::Help);
        assert_eq!(parse(&["colloq", "-h"]), CliCommand::Help);
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse(&["colloq"]), CliCommand::Run);
    }

    #[test]
    fn test_program_name_is_skipped() {
        assert_eq!(parse(&["--version"]), CliCommand::Run);
    }

    #[test]
    fn test_unknown_args_ignored() {
        assert_eq!(parse(&["colloq", "--verbose", "-V"]), CliCommand::Version);
        assert_eq!(parse(&["colloq", "--verbose"]), CliCommand::Run);
    }

    #[test]
    fn test_usage_mentions_env() {
        let text = usage();
        assert!(text.contains("COLLOQ_API_URL"));
        assert!(text.contains("--version"));
    }
}
