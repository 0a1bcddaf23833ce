use log::*;

use crate::SqliteDatabase;

/// A fresh database file in the system temp directory. Each call returns a different path.
pub fn random_db_url() -> String {
    let path = std::env::temp_dir().join(format!("bss_test_store_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

/// Creates a new, migrated database at `url`.
pub async fn prepare_test_db(url: &str) -> SqliteDatabase {
    let _ = env_logger::try_init();
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

/// Closes the pool and removes the database file along with any WAL side files.
pub async fn tear_down(db: SqliteDatabase) {
    db.close().await;
    let path = db.url().trim_start_matches("sqlite://").to_string();
    if let Err(e) = std::fs::remove_file(&path) {
        warn!("Could not remove test database {path}: {e}");
    }
    for suffix in ["-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
}
