mod contact_log;
mod property;

pub use contact_log::*;
pub use property::*;
