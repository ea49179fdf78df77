#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod models;
pub mod prompt;

pub use client::GeminiSummarizer;
pub use config::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiConfig};

// Silence unused dev-dependency warnings
#[cfg(test)]
use axum as _;
#[cfg(test)]
use tokio as _;
