pub mod commands;
pub mod serve;
pub mod validate;
pub mod area;
pub mod drafts;
pub mod geocode;

pub use commands::{Cli, Commands};
