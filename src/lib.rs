pub mod app;
pub mod core;
pub mod events;
pub mod queue;
pub mod resource;
pub mod system_log;
