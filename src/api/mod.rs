//! HTTP plumbing shared by every repository.

mod client;
pub mod envelope;

pub use client::ApiClient;
