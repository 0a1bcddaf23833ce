//! SQLite backend for the book store engine.
//!
//! Documents are kept as JSON text in a single `documents` table and queried with SQLite's JSON1 functions.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
