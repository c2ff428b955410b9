//! Vector store seam plus an embedded SQLite implementation.
//!
//! `SqliteVectorStore` keeps every collection in one SQLite database under the
//! persistence location. Embeddings are stored as little-endian `f32` blobs and
//! searched by brute-force cosine similarity.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// File name of the database inside the persistence location.
pub const DATABASE_FILE: &str = "vectors.sqlite3";

/// Validated collection identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionName(String);

impl CollectionName {
    /// Accepts any name that is non-empty after trimming.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidConfig("collection name is required".into()));
        }
        Ok(Self(name))
    }

    /// Returns the name as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One stored chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEntry {
    /// Unique identifier.
    pub id: String,
    /// Chunk text.
    pub text: String,
    /// Embedding of `text`.
    pub embedding: Vec<f32>,
}

/// Search hit with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    /// Identifier of the matched entry.
    pub id: String,
    /// Chunk text.
    pub text: String,
    /// Cosine similarity to the query, higher is closer.
    pub score: f32,
}

/// Persistence for embedded chunks.
pub trait VectorStore {
    /// Deletes every entry and any on-disk state.
    fn reset(&self) -> Result<()>;

    /// Inserts entries in one batch, replacing existing ones with the same id.
    fn upsert(&self, entries: Vec<StoreEntry>) -> Result<()>;

    /// Returns up to `k` entries nearest to `query`, best first.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredEntry>>;

    /// Number of stored entries.
    fn count(&self) -> Result<usize>;
}

/// SQLite-backed store rooted at a persistence directory.
#[derive(Debug, Clone)]
pub struct SqliteVectorStore {
    location: PathBuf,
    collection: CollectionName,
}

impl SqliteVectorStore {
    /// Points at `collection` under `location`; nothing is opened yet.
    pub fn open(location: impl Into<PathBuf>, collection: CollectionName) -> Self {
        Self {
            location: location.into(),
            collection,
        }
    }

    /// Persistence directory.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Collection served by this store.
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Path of the database file.
    pub fn database_path(&self) -> PathBuf {
        self.location.join(DATABASE_FILE)
    }

    fn connect(&self) -> Result<Connection> {
        fs::create_dir_all(&self.location)?;
        let conn = Connection::open(self.database_path())?;
        init_schema(&conn)?;
        Ok(conn)
    }

    /// Read-only connection, or `None` when the database was never created.
    fn connect_existing(&self) -> Result<Option<Connection>> {
        let path = self.database_path();
        if !path.is_file() {
            return Ok(None);
        }
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let has_table: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'chunks'
            )",
            [],
            |row| row.get(0),
        )?;
        Ok(has_table.then_some(conn))
    }

    fn stored_dimension(&self, conn: &Connection) -> Result<Option<usize>> {
        let dimension: Option<i64> = conn
            .query_row(
                "SELECT dimension FROM chunks WHERE collection = ?1 ORDER BY seq LIMIT 1",
                params![self.collection.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(dimension.map(|d| d as usize))
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS chunks (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            collection TEXT NOT NULL,
            chunk_id TEXT NOT NULL,
            content TEXT NOT NULL,
            dimension INTEGER NOT NULL,
            embedding BLOB NOT NULL,
            UNIQUE (collection, chunk_id)
        );
        CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);",
    )?;
    Ok(())
}

fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

impl VectorStore for SqliteVectorStore {
    fn reset(&self) -> Result<()> {
        if self.location.exists() {
            fs::remove_dir_all(&self.location)?;
            info!(location = %self.location.display(), "removed existing vector store");
        }
        Ok(())
    }

    fn upsert(&self, entries: Vec<StoreEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.connect()?;
        let dimension = match self.stored_dimension(&conn)? {
            Some(dimension) => dimension,
            None => entries[0].embedding.len(),
        };
        if dimension == 0 {
            return Err(Error::Store("embeddings must not be empty".into()));
        }
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimension) {
            return Err(Error::Store(format!(
                "entry {} has dimension {}, collection uses {}",
                bad.id,
                bad.embedding.len(),
                dimension
            )));
        }

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks (collection, chunk_id, content, dimension, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (collection, chunk_id)
                 DO UPDATE SET content = excluded.content, embedding = excluded.embedding",
            )?;
            for entry in &entries {
                stmt.execute(params![
                    self.collection.as_str(),
                    entry.id,
                    entry.text,
                    dimension as i64,
                    serialize_embedding(&entry.embedding),
                ])?;
            }
        }
        tx.commit()?;
        debug!(
            count = entries.len(),
            collection = self.collection.as_str(),
            "entries upserted"
        );
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredEntry>> {
        let empty = || Error::EmptyStore(self.collection.as_str().to_string());
        let conn = self.connect_existing()?.ok_or_else(empty)?;
        let dimension = self.stored_dimension(&conn)?.ok_or_else(empty)?;
        if dimension != query.len() {
            return Err(Error::Store(format!(
                "query has dimension {}, collection uses {}",
                query.len(),
                dimension
            )));
        }

        let mut stmt = conn.prepare(
            "SELECT chunk_id, content, embedding FROM chunks
             WHERE collection = ?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![self.collection.as_str()], |row| {
            let blob: Vec<u8> = row.get(2)?;
            Ok(ScoredEntry {
                id: row.get(0)?,
                text: row.get(1)?,
                score: cosine_similarity(query, &deserialize_embedding(&blob)),
            })
        })?;
        let mut scored = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    fn count(&self) -> Result<usize> {
        let Some(conn) = self.connect_existing()? else {
            return Ok(0);
        };
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![self.collection.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Cosine similarity; zero vectors and length mismatches score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}
