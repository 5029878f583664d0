pub mod snapshot;
pub mod stisys;
pub mod telegram;
