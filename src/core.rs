pub mod interval;
pub mod snapshot;
