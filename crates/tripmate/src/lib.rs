pub mod agent;
pub mod calculator;
pub mod config;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod registry;
pub mod services;
pub mod supervisor;
pub mod toolkits;
pub mod validation;
pub mod workflow;
