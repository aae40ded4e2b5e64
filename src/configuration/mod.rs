mod config;
pub mod language;
mod settings;

pub use config::*;
pub use settings::*;
