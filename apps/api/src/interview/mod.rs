pub mod agents;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod store;
