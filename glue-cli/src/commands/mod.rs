//! CLI command implementations

pub mod backends;
pub mod dump;
pub mod generate;
pub mod init;

pub use backends::backends_command;
pub use dump::dump_command;
pub use generate::{generate_command, GenerateOptions};
pub use init::init_config_command;
