//! Shared utilities for the Teslo realtime packages.

pub mod logger;
pub mod time;
