pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod forms;
pub mod labels;
pub mod listing;
pub mod logging;
pub mod notifications;
