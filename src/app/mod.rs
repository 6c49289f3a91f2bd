pub mod application;
pub mod aws;
pub mod cli;
pub mod config;
pub mod kubectl;
pub mod prompt;
pub mod runner;
