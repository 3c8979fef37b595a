//! `DuckDB` connection pool.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ::duckdb::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

#[derive(Default)]
struct PoolState {
    read_only: Vec<Connection>,
    read_write: Vec<Connection>,
}

impl PoolState {
    fn idle(&mut self, mode: AccessMode) -> &mut Vec<Connection> {
        match mode {
            AccessMode::ReadOnly => &mut self.read_only,
            AccessMode::ReadWrite => &mut self.read_write,
        }
    }
}

struct PoolInner {
    db_path: PathBuf,
    max_pool_size: usize,
    /// Every pooled connection is cloned from this one so they share a
    /// single database instance.
    root: Mutex<Option<Connection>>,
    state: Mutex<PoolState>,
}

impl PoolInner {
    /// Idle connections stay valid even if another thread panicked mid-checkout.
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self) -> Result<Connection, ::duckdb::Error> {
        let mut root = self.root.lock().unwrap_or_else(PoisonError::into_inner);
        let connection = match root.as_ref() {
            Some(root) => root.try_clone()?,
            None => {
                let opened = Connection::open(self.db_path.as_path())?;
                let connection = opened.try_clone()?;
                *root = Some(opened);
                connection
            }
        };
        connection.execute_batch("PRAGMA disable_progress_bar;")?;
        Ok(connection)
    }
}

/// Keeps up to `max_pool_size` idle connections per access mode.
///
/// Read-only checkouts are a pooling distinction; the query layer only
/// issues `SELECT`s on them.
#[derive(Clone)]
pub struct DuckDbConnectionManager {
    inner: Arc<PoolInner>,
}

impl DuckDbConnectionManager {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, max_pool_size: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                db_path: path.into(),
                max_pool_size: max_pool_size.max(1),
                root: Mutex::new(None),
                state: Mutex::new(PoolState::default()),
            }),
        }
    }

    /// Reuses an idle connection or opens a new one.
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened or configured.
    pub fn acquire(&self, mode: AccessMode) -> Result<PooledConnection, ::duckdb::Error> {
        let idle = self.inner.lock().idle(mode).pop();
        let connection = match idle {
            Some(connection) => connection,
            None => self.inner.open()?,
        };

        Ok(PooledConnection {
            mode,
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }

    pub fn idle_connections(&self) -> usize {
        let mut state = self.inner.lock();
        state.idle(AccessMode::ReadOnly).len() + state.idle(AccessMode::ReadWrite).len()
    }
}

/// A connection that goes back to the pool when dropped.
pub struct PooledConnection {
    mode: AccessMode,
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection is present until drop")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection is present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let mut state = self.pool.lock();
        let idle = state.idle(self.mode);
        if idle.len() < self.pool.max_pool_size {
            idle.push(connection);
        }
    }
}
