//! `SqliteDatabase` is a concrete implementation of a book store backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`ResourceStore`] trait.
use std::fmt::Debug;

use log::*;
use sqlx::{SqliteConnection, SqlitePool};

use super::db::{documents, new_pool};
use crate::{
    db_types::{Collection, DeleteReceipt, Document, DocumentId, InsertReceipt, UpdateReceipt},
    traits::{Filter, Patch, ResourceStore, StoreError, UpdateOptions},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl ResourceStore for SqliteDatabase {
    async fn insert(&self, collection: Collection, doc: Document) -> Result<InsertReceipt, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let id = DocumentId::new();
        documents::insert_document(collection, &id, &doc, &mut conn).await?;
        debug!("🗃️ New document {id} saved in {collection}");
        Ok(InsertReceipt::new(id))
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let found = documents::fetch_first(collection, filter, &mut conn).await?;
        trace!("🗃️ find_one in {collection} [{filter}] found a match: {}", found.is_some());
        Ok(found.map(|(id, doc)| documents::with_id(id, doc)))
    }

    async fn find_many(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let docs = documents::fetch_all(collection, filter, &mut conn).await?;
        trace!("🗃️ find_many in {collection} [{filter}] returned {} documents", docs.len());
        Ok(docs)
    }

    /// The read, merge and write happen inside one `BEGIN IMMEDIATE` transaction, which takes the write lock up front.
    /// Concurrent updates therefore queue on the busy timeout instead of failing when a deferred read lock cannot be
    /// upgraded. The transaction runs on its own task so that a dropped request cannot abandon it half way.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: &Patch,
        options: UpdateOptions,
    ) -> Result<UpdateReceipt, StoreError> {
        let task = update_in_transaction(self.pool.clone(), collection, filter.clone(), patch.clone(), options);
        tokio::spawn(task).await.map_err(|e| StoreError::DatabaseError(format!("Update task failed. {e}")))?
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteReceipt, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = documents::delete_first(collection, filter, &mut conn).await?;
        debug!("🗃️ Deleted {deleted} document(s) from {collection} matching [{filter}]");
        Ok(DeleteReceipt::new(deleted))
    }
}

async fn update_in_transaction(
    pool: SqlitePool,
    collection: Collection,
    filter: Filter,
    patch: Patch,
    options: UpdateOptions,
) -> Result<UpdateReceipt, StoreError> {
    let mut conn = pool.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
    let result = match merge_document(collection, &filter, &patch, options, &mut conn).await {
        Ok(receipt) => sqlx::query("COMMIT").execute(&mut *conn).await.map(|_| receipt).map_err(StoreError::from),
        Err(e) => Err(e),
    };
    if result.is_err() {
        if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
            warn!("🗃️ Could not roll back failed update in {collection}. {e}");
        }
    }
    result
}

async fn merge_document(
    collection: Collection,
    filter: &Filter,
    patch: &Patch,
    options: UpdateOptions,
    conn: &mut SqliteConnection,
) -> Result<UpdateReceipt, StoreError> {
    match documents::fetch_first(collection, filter, conn).await? {
        Some((id, mut doc)) => {
            let modified = patch.apply_to(&mut doc);
            if modified {
                documents::replace_body(collection, &id, &doc, conn).await?;
            }
            debug!("🗃️ Document {id} in {collection} matched [{filter}]. Modified: {modified}");
            Ok(UpdateReceipt::matched(modified))
        },
        None if options.upsert => {
            let id = filter.id.unwrap_or_default();
            let mut doc = filter.seed_document();
            patch.apply_to(&mut doc);
            documents::insert_document(collection, &id, &doc, conn).await?;
            debug!("🗃️ Nothing in {collection} matched [{filter}]. Upserted document {id}");
            Ok(UpdateReceipt::upserted(id))
        },
        None => {
            debug!("🗃️ Nothing in {collection} matched [{filter}]. No update was made");
            Ok(UpdateReceipt::no_match())
        },
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Migrations are embedded in the binary, so this is safe to call on every start.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Could not run migrations. {e}")))?;
        info!("🚀️ Database migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
