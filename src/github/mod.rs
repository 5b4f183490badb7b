pub mod client;
pub mod convert;
pub mod graphql;
pub mod models;
pub mod rest;

pub use client::GitHubClient;
pub use models::*;
