pub mod audit;
pub mod client;
pub mod config;
pub mod errors;
pub mod extract;
pub mod gates;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod phase;
pub mod prompts;
pub mod provider;
pub mod session;
pub mod transcript;
pub mod ui;
