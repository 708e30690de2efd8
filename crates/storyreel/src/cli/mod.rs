//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the storyreel binary.

mod commands;
mod license;
mod logging;
mod script;
mod setup;

pub use commands::{Cli, Commands};
pub use license::{handle_activate, handle_keygen, handle_logout, handle_status};
pub use logging::init_logging;
pub use script::{GenerateArgs, handle_extend, handle_generate};
pub use setup::load_config;
