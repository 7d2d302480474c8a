//! Article persistence on a pooled SQLite database.
//!
//! Every operation checks out one connection, runs one parameterized
//! statement and hands the connection back before returning. Nothing is
//! cached and no transaction spans two operations: concurrent updates to the
//! same article race inside SQLite and the last write wins.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bb8::{Pool, PooledConnection};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::{StoreError, StoreResult};

const CREATE_ARTICLES: &str = "CREATE TABLE IF NOT EXISTS articles (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    body  TEXT
)";

/// How long SQLite itself waits on a locked database file.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One stored article.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub body: String,
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get("id")?,
        title: row.get("title")?,
        body: row.get::<_, Option<String>>("body")?.unwrap_or_default(),
    })
}

// ── Connection manager ────────────────────────────────────────────────────────

/// Opens SQLite connections for the bb8 pool.
pub struct SqliteConnectionManager {
    path: PathBuf,
}

impl SqliteConnectionManager {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl bb8::ManageConnection for SqliteConnectionManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // WAL lets readers proceed while a writer holds the file.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        Ok(conn)
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        conn.query_row("SELECT 1", [], |_| Ok(()))
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

// ── ArticleStore ──────────────────────────────────────────────────────────────

/// Owns the `articles` table. Cheap to clone: clones share one pool.
#[derive(Clone)]
pub struct ArticleStore {
    pool: Pool<SqliteConnectionManager>,
}

impl ArticleStore {
    /// Opens the pool and creates the `articles` table if it is missing.
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let started_at = Instant::now();
        let max_open = config.max_open.max(1);

        let pool = Pool::builder()
            .max_size(max_open)
            .min_idle(Some(config.min_idle()))
            .max_lifetime(config.max_lifetime())
            .connection_timeout(config.acquire_timeout())
            .build(SqliteConnectionManager::new(&config.path))
            .await?;

        let store = Self { pool };
        store.create_table().await?;

        info!(
            path = %config.path.display(),
            max_open,
            min_idle = config.min_idle(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "article store ready"
        );
        Ok(store)
    }

    async fn conn(&self) -> StoreResult<PooledConnection<'_, SqliteConnectionManager>> {
        Ok(self.pool.get().await?)
    }

    async fn create_table(&self) -> StoreResult<()> {
        let conn = self.conn().await?;
        conn.execute_batch(CREATE_ARTICLES)?;
        Ok(())
    }

    /// Inserts an article and returns the id SQLite assigned to it.
    pub async fn create(&self, title: &str, body: &str) -> StoreResult<i64> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO articles (title, body) VALUES (?1, ?2)",
            params![title, body],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, "article created");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> StoreResult<Article> {
        let conn = self.conn().await?;
        conn.query_row(
            "SELECT id, title, body FROM articles WHERE id = ?1",
            [id],
            article_from_row,
        )
        .optional()?
        .ok_or(StoreError::NotFound)
    }

    /// Every article, in whatever order SQLite scans them.
    ///
    /// A row that fails to decode fails the whole listing.
    pub async fn list(&self) -> StoreResult<Vec<Article>> {
        let conn = self.conn().await?;
        let mut stmt = conn.prepare("SELECT id, title, body FROM articles")?;
        let articles = stmt
            .query_map([], article_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(articles)
    }

    /// Rewrites title and body. Returns the number of rows changed: `0` when
    /// the article is gone or already holds exactly these values.
    pub async fn update(&self, id: i64, title: &str, body: &str) -> StoreResult<u64> {
        let conn = self.conn().await?;
        let changed = conn.execute(
            "UPDATE articles SET title = ?1, body = ?2
             WHERE id = ?3 AND (title IS NOT ?1 OR body IS NOT ?2)",
            params![title, body, id],
        )?;
        debug!(id, changed, "article updated");
        Ok(changed as u64)
    }

    /// Removes the article for good. `0` means it was already absent.
    pub async fn delete(&self, id: i64) -> StoreResult<u64> {
        let conn = self.conn().await?;
        let removed = conn.execute("DELETE FROM articles WHERE id = ?1", [id])?;
        debug!(id, removed, "article deleted");
        Ok(removed as u64)
    }

    /// Round trip used by the readiness probe.
    pub async fn ping(&self) -> StoreResult<()> {
        let conn = self.conn().await?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}
