/*!
 * Store connection management.
 *
 * A single SQLite connection behind `Arc<Mutex<_>>`; every access goes
 * through [`StoreConnection::execute`] or [`StoreConnection::transaction`].
 */

use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::schema;
use crate::errors::StoreError;

/// Store connection wrapper with thread-safe access
#[derive(Clone)]
pub struct StoreConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl StoreConnection {
    /// Create an empty store at `db_path`, replacing any previous one
    pub fn create<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut candidate = db_path.clone().into_os_string();
            candidate.push(suffix);
            let candidate = PathBuf::from(candidate);
            if candidate.exists() {
                debug!("Removing previous store file {:?}", candidate);
                std::fs::remove_file(&candidate)?;
            }
        }

        info!("Creating vector store at: {:?}", db_path);
        Self::open_unchecked(db_path)
    }

    /// Open an existing store
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();
        if !db_path.is_file() {
            return Err(StoreError::NotIndexed(db_path.display().to_string()));
        }

        debug!("Opening vector store at: {:?}", db_path);
        Self::open_unchecked(db_path)
    }

    /// Create an in-memory store (for testing)
    pub fn new_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    fn open_unchecked(db_path: PathBuf) -> Result<Self, StoreError> {
        let conn = Connection::open(&db_path)?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run `f` with the locked connection
    pub fn execute<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self
            .connection
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;

        f(&conn)
    }

    /// Run `f` inside a transaction that commits when it returns `Ok`
    pub fn transaction<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T, StoreError>,
    {
        let mut conn = self
            .connection
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;

        Ok(result)
    }
}
