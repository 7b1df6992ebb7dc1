/// Basic application code
pub mod app;
/// Actor extraction from bearer tokens
pub mod auth;
/// REST clients for outside services
pub mod client;
/// Controllers for REST endpoints
pub mod controller;
/// Cryptography-related objects
pub mod crypto;
/// Validated value types and the lifecycle state machine
pub mod domain;
/// Core error taxonomy
pub mod error;
/// Offers, reservations, availability and notifications
pub mod marketplace;
/// Stored records and the views built from them
pub mod model;
/// Repositories
pub mod repo;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
