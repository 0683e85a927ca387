pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod mirror;
pub mod model;
pub mod output;
pub mod resolver;
pub mod selector;
pub mod sources;
pub mod sync;

#[cfg(test)]
mod test_helpers;
