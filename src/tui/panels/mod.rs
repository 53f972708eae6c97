pub mod bots;
pub mod dashboard;
pub mod detection;
pub mod news;
pub mod notifications;
pub mod soil;
