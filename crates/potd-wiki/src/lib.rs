#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// The HTTP backend is an implementation detail; callers go through
// `WikipediaPort` and never name the generic parameter.
#![allow(private_interfaces, private_bounds)]

mod client;
mod config;
mod error;
mod http;

// Client
pub use client::{DefaultWikipediaClient, WikipediaClient};

// Configuration
pub use config::{DEFAULT_MAIN_PAGE_URL, DEFAULT_USER_AGENT, WikiClientConfig};

pub use error::WikiError;

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
