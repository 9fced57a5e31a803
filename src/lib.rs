pub mod analysis;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod models;
pub mod report;
pub mod services;
pub mod utils;
