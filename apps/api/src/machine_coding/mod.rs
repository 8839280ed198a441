//! Machine-coding practice proxy: records sessions, generated questions and
//! graded submissions in the hosted document database, and reports per-user
//! analytics back to the front-end.

pub mod analytics;
pub mod atlas;
pub mod handlers;
pub mod models;
