//! # Book Sale Server
//! This crate hosts the HTTP API for the online book store. It is responsible for:
//! Identifying callers from their bearer tokens.
//! Translating requests into calls on the [`book_sale_engine`] API objects, and their results into JSON responses.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! See [routes](routes/index.html). Every route is registered by [`server::configure_app`].

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
