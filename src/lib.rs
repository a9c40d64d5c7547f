pub mod budget;
pub mod config;
pub mod guide;
pub mod model;
pub mod prompts;
pub mod report;
pub mod search;
