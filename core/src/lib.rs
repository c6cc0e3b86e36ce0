pub mod aggregate;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod provider;
pub mod record;
pub mod report;
pub mod rng;
pub mod scoring;
pub mod synthetic;
pub mod types;
