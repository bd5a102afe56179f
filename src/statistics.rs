pub mod flow;
pub mod hourly;
pub mod integrator;
pub mod summary;
