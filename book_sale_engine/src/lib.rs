//! Book Sale Engine
//!
//! The engine holds the data layer of the online book store: users, books, orders and reviews, and the single
//! authorization rule that guards promoting users to admins.
//!
//! The library is divided into three sections:
//! 1. Storage contracts ([`mod@traits`]). Every collection is a bag of schemaless JSON documents behind the
//!    [`ResourceStore`] trait. Backends implement this one trait and nothing else.
//! 2. Backends. SQLite ([`SqliteDatabase`]) is the supported backend. It keeps documents as JSON text and queries them
//!    with SQLite's JSON functions.
//! 3. The engine's public API ([`mod@bss_api`]). One API object per collection, plus [`AuthApi`], which checks a
//!    requester's role before granting admin rights to another user.
//!
//! The data types shared by all of these live in [`mod@db_types`].
pub mod bss_api;
pub mod db_types;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "test_utils")]
pub mod test_utils;

pub use bss_api::{
    auth_api::AuthApi,
    book_api::BookApi,
    book_objects::BookDetails,
    errors::AuthApiError,
    order_api::OrderApi,
    review_api::ReviewApi,
    user_api::UserApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{Filter, Patch, ResourceStore, StoreError, UpdateOptions};
