
pub mod pretty;

use serde::{Deserialize, Serialize};
use std::{fmt, io, path::PathBuf};
use thiserror::Error;
use types::AttrType;

/// Zero-based index of a page within a page file.
/// Examples:
/// - `let header: PageNum = 0;`
/// - `let first_data_page: PageNum = 1;`
pub type PageNum = u32;

/// Fully-qualified identifier of a record slot within a table file.
///
/// The fields are `i32` because the pair is stored on disk as two
/// native-endian 32-bit integers, with `(-1, -1)` as the "no record"
/// sentinel used by index nodes.
///
/// Examples:
/// - `let rid = RecordId::new(1, 0); // first slot of the first data page`
/// - `let hole = RecordId::NONE;`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId {
    pub page: i32,
    pub slot: i32,
}

impl RecordId {
    /// Sentinel for an unoccupied record reference.
    pub const NONE: RecordId = RecordId { page: -1, slot: -1 };

    pub fn new(page: i32, slot: i32) -> Self {
        Self { page, slot }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.page, self.slot)
    }
}

/// Canonical error type shared across the storage engine layers.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("page {0} does not exist")]
    PageOutOfRange(i64),
    #[error("file close failed: {0}")]
    FileCloseFailed(String),
    #[error("pinned pages in buffer")]
    PinnedPagesInBuffer,
    #[error("buffer: {0}")]
    Buffer(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("schema: {0}")]
    SchemaError(String),
    #[error("no record at {0}")]
    NoRecordAtRid(RecordId),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(AttrType),
    #[error("key {0} not found")]
    KeyNotFound(i32),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias that carries a `DbError`.
pub type DbResult<T> = Result<T, DbError>;

/// Runtime configuration for the storage engine components.
///
/// # Example
/// ```
/// use common::Config;
/// use std::path::PathBuf;
///
/// let config = Config::builder()
///     .data_dir(PathBuf::from("./my_db"))
///     .table_pool_pages(200)
///     .index_pool_pages(16)
///     .build();
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
pub struct Config {
    /// Directory where table and index files live.
    #[builder(default = PathBuf::from("./db_data"))]
    pub data_dir: PathBuf,
    /// Frames kept resident by a table's buffer pool.
    #[builder(default = 100)]
    pub table_pool_pages: usize,
    /// Frames kept resident by an index's buffer pool.
    #[builder(default = 10)]
    pub index_pool_pages: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./db_data"),
            table_pool_pages: 100,
            index_pool_pages: 10,
        }
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::{Config, DbError, DbResult, PageNum, RecordId};
    pub use types::{AttrType, Value};
}
