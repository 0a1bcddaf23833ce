//! # Storage contracts
//!
//! This module defines what a storage backend must provide to serve the book store.
//!
//! The engine has a single storage trait, [`ResourceStore`]. It is a generic keyed-document store: every collection
//! (users, books, orders, reviews) is a bag of schemaless JSON documents, selected with a [`Filter`] and modified with
//! a [`Patch`]. Collection-specific behaviour lives one level up, in the APIs that wrap a store.
mod data_objects;
mod resource_store;

pub use data_objects::{Filter, Patch, UpdateOptions};
pub use resource_store::{ResourceStore, StoreError};
