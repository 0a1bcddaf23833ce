//! The public API of the book store engine.
//!
//! Each collection gets its own API object wrapping a [`ResourceStore`](crate::traits::ResourceStore) backend. The
//! objects are cheap and hold nothing but the backend handle, so a server typically builds one of each per worker from
//! a cloned connection pool.
pub mod auth_api;
pub mod book_api;
pub mod book_objects;
pub mod errors;
pub mod order_api;
pub mod review_api;
pub mod user_api;
