pub mod parser;
pub mod schema;
pub mod types;
pub mod security;
pub mod credentials;

pub use types::*;
pub use parser::{load_config, parse_config, DEFAULT_CONFIG_FILE};
