mod action;
mod affordance;
mod delivery;
mod inject;
mod sink;

pub use action::*;
pub use affordance::*;
pub use delivery::*;
pub use inject::*;
pub use sink::*;
