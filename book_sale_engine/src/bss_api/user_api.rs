use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Collection, Document, InsertReceipt, Role, UpdateReceipt},
    traits::{Filter, Patch, ResourceStore, StoreError, UpdateOptions},
};

/// Users are keyed by this field for lookups and upserts.
pub const EMAIL_FIELD: &str = "email";

/// The `UserApi` provides a unified API for user profiles.
pub struct UserApi<B> {
    db: B,
}

impl<B: Debug> Debug for UserApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserApi ({:?})", self.db)
    }
}

impl<B> UserApi<B>
where B: ResourceStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Stores a new user profile as-is. No uniqueness check is made on the email.
    pub async fn create_user(&self, user: Document) -> Result<InsertReceipt, StoreError> {
        self.db.insert(Collection::Users, user).await
    }

    /// Sets every field in `profile` on the user with the given email, creating the user if there is none.
    pub async fn upsert_user(&self, email: &str, profile: Document) -> Result<UpdateReceipt, StoreError> {
        trace!("Upserting user {email}");
        let filter = Filter::field_eq(EMAIL_FIELD, email);
        self.db.update_one(Collection::Users, &filter, &Patch::set(profile), UpdateOptions::upsert()).await
    }

    pub async fn fetch_user(&self, email: &str) -> Result<Option<Document>, StoreError> {
        self.db.find_one(Collection::Users, &Filter::field_eq(EMAIL_FIELD, email)).await
    }

    /// Unknown users are simply not admins.
    pub async fn is_admin(&self, email: &str) -> Result<bool, StoreError> {
        let user = self.fetch_user(email).await?;
        Ok(user.is_some_and(|u| Role::of(&u) == Role::Admin))
    }
}
