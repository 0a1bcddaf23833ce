use std::fmt::Debug;

use crate::{
    bss_api::order_api::OWNER_EMAIL_FIELD,
    db_types::{Collection, Document, InsertReceipt},
    traits::{Filter, ResourceStore, StoreError},
};

/// The `ReviewApi` stores reader reviews. Reviews can be written and read, never changed.
pub struct ReviewApi<B> {
    db: B,
}

impl<B: Debug> Debug for ReviewApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReviewApi ({:?})", self.db)
    }
}

impl<B> ReviewApi<B>
where B: ResourceStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn create_review(&self, review: Document) -> Result<InsertReceipt, StoreError> {
        self.db.insert(Collection::Reviews, review).await
    }

    pub async fn reviews_for_user(&self, email: &str) -> Result<Vec<Document>, StoreError> {
        self.db.find_many(Collection::Reviews, &Filter::field_eq(OWNER_EMAIL_FIELD, email)).await
    }

    pub async fn all_reviews(&self) -> Result<Vec<Document>, StoreError> {
        self.db.find_many(Collection::Reviews, &Filter::all()).await
    }
}
