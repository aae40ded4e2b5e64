pub mod actions;
pub mod clipboard;
mod delivery;
pub mod events;
pub mod plan;
pub mod receiver;
pub mod template;
pub mod text;

pub use delivery::*;
