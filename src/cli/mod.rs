//! CLI module for colloq.
//!
//! - `args` - process arguments (`--version`, `--help`)
//! - `command` - lines typed into the interactive session
//! - `report` - what is printed when an exchange fails
//! - `version` - version string
//!
//! ```ignore
//! use colloq::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args()) {
//!     CliCommand::Version => println!("{}", colloq::cli::version_line()),
//!     CliCommand::Help => println!("{}", colloq::cli::usage()),
//!     CliCommand::Run => { /* start the session */ }
//! }
//! ```

pub mod args;
pub mod command;
pub mod report;
pub mod version;

pub use args::{parse_args, usage, CliCommand};
pub use command::{parse_command, ReplCommand, HELP_TEXT};
pub use report::failure_report;
pub use version::{version_line, VERSION};
