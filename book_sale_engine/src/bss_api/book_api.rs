use std::fmt::Debug;

use crate::{
    bss_api::book_objects::BookDetails,
    db_types::{Collection, DeleteReceipt, Document, DocumentId, InsertReceipt, UpdateReceipt},
    traits::{Filter, ResourceStore, StoreError, UpdateOptions},
};

/// The `BookApi` manages the catalogue of books for sale.
pub struct BookApi<B> {
    db: B,
}

impl<B: Debug> Debug for BookApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BookApi ({:?})", self.db)
    }
}

impl<B> BookApi<B>
where B: ResourceStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn create_book(&self, book: Document) -> Result<InsertReceipt, StoreError> {
        self.db.insert(Collection::Books, book).await
    }

    pub async fn all_books(&self) -> Result<Vec<Document>, StoreError> {
        self.db.find_many(Collection::Books, &Filter::all()).await
    }

    pub async fn fetch_book(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        self.db.find_one(Collection::Books, &Filter::by_id(id)).await
    }

    pub async fn delete_book(&self, id: DocumentId) -> Result<DeleteReceipt, StoreError> {
        self.db.delete_one(Collection::Books, &Filter::by_id(id)).await
    }

    /// Overwrites the listing fields of the book with `id`. If no such book exists, one is created with that id.
    pub async fn replace_book(&self, id: DocumentId, details: &BookDetails) -> Result<UpdateReceipt, StoreError> {
        let patch = details.to_patch();
        self.db.update_one(Collection::Books, &Filter::by_id(id), &patch, UpdateOptions::upsert()).await
    }
}
