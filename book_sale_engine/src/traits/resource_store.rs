use thiserror::Error;

use crate::{
    db_types::{Collection, DeleteReceipt, Document, InsertReceipt, UpdateReceipt},
    traits::{Filter, Patch, UpdateOptions},
};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Could not serialize document: {0}")]
    SerializationError(String),
    #[error("Stored document is corrupt: {0}")]
    CorruptDocument(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::SerializationError(e.to_string())
    }
}

/// The `ResourceStore` trait defines the contract for document storage backends.
///
/// Every method works on a single named [`Collection`]. Documents are schemaless JSON objects; the store assigns each
/// one a [`DocumentId`](crate::db_types::DocumentId) on insert and exposes it under the `_id` key whenever the document
/// is read back.
///
/// Single-document operations must be atomic. Nothing spans more than one document, so there are no transactions at
/// this level.
#[allow(async_fn_in_trait)]
pub trait ResourceStore {
    /// Stores a new document and returns its freshly assigned identifier. Any `_id` the caller supplied is discarded.
    async fn insert(&self, collection: Collection, doc: Document) -> Result<InsertReceipt, StoreError>;

    /// Fetches the first document matching `filter`, or `None` if nothing matches.
    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError>;

    /// Fetches every document matching `filter`. Callers must not rely on the order of the results.
    async fn find_many(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Applies `patch` to the first document matching `filter`.
    ///
    /// If nothing matches and `options.upsert` is set, a new document is created from the filter's equality fields
    /// overlaid with the patch. When the filter names an identifier, the new document takes that identifier.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: &Patch,
        options: UpdateOptions,
    ) -> Result<UpdateReceipt, StoreError>;

    /// Deletes the first document matching `filter`. Deleting nothing is not an error.
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteReceipt, StoreError>;
}
