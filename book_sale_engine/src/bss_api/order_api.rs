use std::fmt::Debug;

use crate::{
    db_types::{Collection, DeleteReceipt, Document, DocumentId, InsertReceipt},
    traits::{Filter, ResourceStore, StoreError},
};

/// Orders and reviews record their owner's email under this field.
pub const OWNER_EMAIL_FIELD: &str = "userEmail";

/// The `OrderApi` records book orders. Orders are never updated, only created and deleted.
pub struct OrderApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi ({:?})", self.db)
    }
}

impl<B> OrderApi<B>
where B: ResourceStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn create_order(&self, order: Document) -> Result<InsertReceipt, StoreError> {
        self.db.insert(Collection::Orders, order).await
    }

    /// Fetches exactly the orders whose owner email equals `email`.
    pub async fn orders_for_user(&self, email: &str) -> Result<Vec<Document>, StoreError> {
        self.db.find_many(Collection::Orders, &Filter::field_eq(OWNER_EMAIL_FIELD, email)).await
    }

    pub async fn all_orders(&self) -> Result<Vec<Document>, StoreError> {
        self.db.find_many(Collection::Orders, &Filter::all()).await
    }

    pub async fn delete_order(&self, id: DocumentId) -> Result<DeleteReceipt, StoreError> {
        self.db.delete_one(Collection::Orders, &Filter::by_id(id)).await
    }
}
