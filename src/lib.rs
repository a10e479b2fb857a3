#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
pub mod best_effort;
pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod error;
pub mod routes;
pub mod security;
pub mod startup;
pub mod telemetry;

pub use email_client::EmailClient;
pub use startup::Application;
