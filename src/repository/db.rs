//! Database Connection and Setup
//!
//! Manages the SQLite connection, migrations and the transaction wrapper
//! every mutating operation runs through.

use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};

use crate::config::AppConfig;
use crate::domain::{DomainError, DomainResult};
use super::metrics::DbMetrics;

/// Time bounds applied to every operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxLimits {
    /// SQLite busy handler timeout for foreign write locks
    pub busy_timeout: Duration,
    /// Wait for the shared connection
    pub lock_timeout: Duration,
    /// Whole read-then-write sequence, checked before each write and before commit
    pub transaction_timeout: Duration,
}

impl Default for TxLimits {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl TxLimits {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            busy_timeout: config.busy_timeout(),
            lock_timeout: config.lock_timeout(),
            transaction_timeout: config.transaction_timeout(),
        }
    }
}

/// Point in time after which an open transaction must give up
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    pub fn check(&self, step: &str) -> DomainResult<()> {
        if Instant::now() >= self.0 {
            Err(DomainError::PersistenceTimeout(format!(
                "Transaction deadline exceeded before {}",
                step
            )))
        } else {
            Ok(())
        }
    }
}

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub(crate) conn: Arc<Mutex<Option<Connection>>>,
    pub db_path: PathBuf,
    limits: TxLimits,
    metrics: Arc<DbMetrics>,
}

impl DbState {
    /// Uninitialized state; `init_db` fills in the connection
    pub fn new(db_path: PathBuf, limits: TxLimits) -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
            db_path,
            limits,
            metrics: Arc::new(DbMetrics::default()),
        }
    }

    pub fn limits(&self) -> TxLimits {
        self.limits
    }

    pub fn metrics(&self) -> &DbMetrics {
        &self.metrics
    }

    pub async fn is_initialized(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    async fn lock(&self) -> DomainResult<MutexGuard<'_, Option<Connection>>> {
        match tokio::time::timeout(self.limits.lock_timeout, self.conn.lock()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                let err = DomainError::PersistenceTimeout(format!(
                    "Timed out after {:?} waiting for the database connection",
                    self.limits.lock_timeout
                ));
                self.metrics.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Run read-only queries on the shared connection
    pub async fn read<T, F>(&self, f: F) -> DomainResult<T>
    where
        F: FnOnce(&Connection) -> DomainResult<T> + Send,
        T: Send,
    {
        let guard = self.lock().await?;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;
        f(conn)
    }

    /// Run `f` inside one IMMEDIATE transaction.
    ///
    /// Commits when `f` succeeds within the deadline, otherwise rolls back
    /// everything `f` wrote. Errors are returned unchanged; nothing is retried.
    pub async fn with_transaction<T, F>(&self, f: F) -> DomainResult<T>
    where
        F: FnOnce(&Transaction<'_>, Deadline) -> DomainResult<T> + Send,
        T: Send,
    {
        let mut guard = self.lock().await?;
        let conn = guard.as_mut().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let deadline = Deadline::after(self.limits.transaction_timeout);
        let tx = match conn.transaction_with_behavior(TransactionBehavior::Immediate) {
            Ok(tx) => tx,
            Err(e) => {
                let err = db_err(e);
                self.metrics.record_failure(&err);
                log::warn!("Could not begin transaction: {}", err);
                return Err(err);
            }
        };

        let result = f(&tx, deadline).and_then(|value| {
            deadline.check("commit")?;
            Ok(value)
        });

        match result {
            Ok(value) => match tx.commit() {
                Ok(()) => {
                    self.metrics.record_commit();
                    Ok(value)
                }
                Err(e) => {
                    let err = db_err(e);
                    self.metrics.record_failure(&err);
                    log::warn!("Commit failed: {}", err);
                    Err(err)
                }
            },
            Err(err) => {
                if let Err(e) = tx.rollback() {
                    log::error!("Rollback failed after {}: {}", err, e);
                }
                self.metrics.record_rollback();
                self.metrics.record_failure(&err);
                log::warn!("Transaction rolled back: {}", err);
                Err(err)
            }
        }
    }

    /// Cheap round trip to confirm the connection is usable
    pub async fn health_check(&self) -> DomainResult<()> {
        self.read(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(db_err)
                .map(|_| ())
        })
        .await
    }
}

/// Classify a SQLite error for callers
pub fn db_err(e: rusqlite::Error) -> DomainError {
    match &e {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                DomainError::ConcurrentModification(e.to_string())
            }
            ErrorCode::OperationInterrupted => DomainError::PersistenceTimeout(e.to_string()),
            _ => DomainError::Internal(e.to_string()),
        },
        rusqlite::Error::QueryReturnedNoRows => DomainError::NotFound(e.to_string()),
        _ => DomainError::Internal(e.to_string()),
    }
}

/// Current time in unix millis, used for created_at/updated_at
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Initialize database with path
pub async fn init_db(db_path: &Path, limits: TxLimits) -> Result<DbState, String> {
    let conn = Connection::open(db_path)
        .map_err(|e| format!("Failed to open {}: {}", db_path.display(), e))?;

    conn.busy_timeout(limits.busy_timeout)
        .map_err(|e| format!("Failed to set busy timeout: {}", e))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| format!("Failed to enable foreign keys: {}", e))?;

    run_migrations(&conn)?;

    let state = DbState::new(db_path.to_path_buf(), limits);
    *state.conn.lock().await = Some(conn);
    log::info!("Database ready at {}", db_path.display());

    Ok(state)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(|e| e.to_string())?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| e.to_string())?;

    for name in names {
        if name.map_err(|e| e.to_string())? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS boards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            position INTEGER CHECK (position >= 0),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            section_id INTEGER NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            content TEXT,
            position INTEGER CHECK (position >= 0),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS task_comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            body TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS task_documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );",
    )
    .map_err(|e| format!("Failed to create tables: {}", e))?;

    // Task scheduling columns were added after the first schema
    if !column_exists(conn, "tasks", "priority")? {
        conn.execute("ALTER TABLE tasks ADD COLUMN priority TEXT NOT NULL DEFAULT 'normal'", [])
            .map_err(|e| format!("Failed to add priority: {}", e))?;
    }

    if !column_exists(conn, "tasks", "due_at")? {
        conn.execute("ALTER TABLE tasks ADD COLUMN due_at INTEGER", [])
            .map_err(|e| format!("Failed to add due_at: {}", e))?;
    }

    // Indexes for container scans in position order
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_sections_board ON sections(board_id, position);
        CREATE INDEX IF NOT EXISTS idx_tasks_section ON tasks(section_id, position);
        CREATE INDEX IF NOT EXISTS idx_task_comments_task ON task_comments(task_id);
        CREATE INDEX IF NOT EXISTS idx_task_documents_task ON task_documents(task_id);",
    )
    .map_err(|e| format!("Failed to create indexes: {}", e))?;

    Ok(())
}
