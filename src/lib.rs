pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod record_store;
pub mod routes;
pub mod startup;
pub mod telemetry;
