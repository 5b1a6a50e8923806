pub mod app;
pub mod cli;
pub mod config;
pub mod render;
pub mod schedule;
pub mod timeofday;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
