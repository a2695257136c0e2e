//! Client for the exercise service's structured-output completions API.

pub mod client;
pub mod requests;

pub use client::Client;
