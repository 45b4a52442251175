pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod output;
pub mod panel;
pub mod payload;
pub mod render;
pub mod request;
pub mod state;
pub mod stats;
pub mod utils;

#[cfg(test)]
mod tests;
