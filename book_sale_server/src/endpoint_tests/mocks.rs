use book_sale_engine::{
    db_types::{Collection, DeleteReceipt, Document, InsertReceipt, UpdateReceipt},
    Filter,
    Patch,
    ResourceStore,
    StoreError,
    UpdateOptions,
};
use mockall::mock;

mock! {
    pub Store {}
    impl Clone for Store {
        fn clone(&self) -> Self;
    }
    impl ResourceStore for Store {
        async fn insert(&self, collection: Collection, doc: Document) -> Result<InsertReceipt, StoreError>;
        async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError>;
        async fn find_many(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError>;
        async fn update_one(&self, collection: Collection, filter: &Filter, patch: &Patch, options: UpdateOptions) -> Result<UpdateReceipt, StoreError>;
        async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteReceipt, StoreError>;
    }
}

/// A store whose every operation fails, as if the database had gone away.
pub fn unavailable_store() -> MockStore {
    let mut store = MockStore::new();
    store.expect_clone().returning(unavailable_store);
    store.expect_insert().returning(|_, _| Err(StoreError::DatabaseError("connection refused".into())));
    store.expect_find_one().returning(|_, _| Err(StoreError::DatabaseError("connection refused".into())));
    store.expect_find_many().returning(|_, _| Err(StoreError::DatabaseError("connection refused".into())));
    store.expect_update_one().returning(|_, _, _, _| Err(StoreError::DatabaseError("connection refused".into())));
    store.expect_delete_one().returning(|_, _| Err(StoreError::DatabaseError("connection refused".into())));
    store
}
