//! Cinedex command-line front end
//!
//! Configuration loading and wiring of the catalog manager; the binary in
//! `main.rs` only parses arguments and prints.

pub mod config;
pub mod error;
pub mod state;
