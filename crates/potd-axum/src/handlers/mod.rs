//! HTTP handlers.

pub mod potd;
pub mod system;
