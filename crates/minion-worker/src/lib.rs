pub mod config;
pub mod minion;

pub use config::MinionConfig;
pub use minion::{Minion, MinionState};
