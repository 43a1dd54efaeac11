//! Client for a Stargate USDC wrapper vault: typed contract access, a
//! three-mode deposit / withdraw / claim panel, and the CLI around them.

pub mod amount;
mod bindings;
pub mod cli;
pub mod config;
pub mod error;
pub mod panel;
pub mod vault;

pub use config::{setup_file_tracing, setup_tracing};

#[cfg(test)]
pub mod test_utils;
