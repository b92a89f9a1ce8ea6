mod config;
mod contribute;

pub use config::cmd_config;
pub use contribute::{ContributeOptions, cmd_contribute};
