pub mod alarms;
pub mod backend;
pub mod feed;
pub mod measurements;
pub mod settings;
