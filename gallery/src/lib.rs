//! Photo gallery web application

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Image blob storage
pub mod media_storage;

/// HTTP routes
pub mod routes;

/// Server startup
pub mod server;

/// Gallery usage statistics
pub mod statistics;

/// Configuration, errors and extractors
pub mod types;

/// HTML pages
pub mod views;
