//! Record manager: tables of fixed-size tuples on slotted pages.
//!
//! A table file reserves page 0 for its header (counters plus the encoded
//! schema); data pages follow, each partitioned into equal-size slots. A
//! slot's first byte is its tombstone (`b'+'` occupied, `b'-'` deleted),
//! the attribute encoding follows.
//!
//! All page access flows through a per-table [`BufferPool`]; every
//! operation pins the page it touches and unpins it before returning.

mod record;
mod scan;
mod schema;

pub use record::{Record, TOMBSTONE_DEAD, TOMBSTONE_LIVE};
pub use scan::Scan;
pub use schema::{Attribute, MAX_ATTR_NAME, Schema};

use std::path::Path;

use buffer::{BufferPool, ReplacementPolicy};
use common::{Config, DbError, DbResult, PageNum, RecordId};
use expr::Expr;
use log::trace;
use storage::{PAGE_SIZE, PageFile};

/// An open table of fixed-schema records.
#[derive(Debug)]
pub struct Table {
    pool: BufferPool,
    schema: Schema,
    num_records: u32,
    free_page_hint: PageNum,
}

impl Table {
    /// Create a table file at `path`: a header page carrying `schema`,
    /// with data pages created lazily on insert.
    pub fn create(path: &Path, schema: &Schema) -> DbResult<()> {
        PageFile::create(path)?;
        let mut file = PageFile::open(path)?;
        let mut page = vec![0u8; PAGE_SIZE];
        schema.encode_header(0, 1, &mut page)?;
        file.write_page(0, &page)?;
        file.close()
    }

    /// Open the table at `path` with default configuration.
    pub fn open(path: &Path) -> DbResult<Self> {
        Self::open_with(path, &Config::default())
    }

    /// Open the table at `path`, sizing its buffer pool from `config`.
    pub fn open_with(path: &Path, config: &Config) -> DbResult<Self> {
        let mut pool = BufferPool::open(path, config.table_pool_pages, ReplacementPolicy::Lru)?;
        pool.pin(0)?;
        let decoded = Schema::decode_header(pool.page(0)?);
        pool.unpin(0)?;
        let (schema, num_records, free_page_hint) = decoded?;
        Ok(Self {
            pool,
            schema,
            num_records,
            free_page_hint,
        })
    }

    /// Persist the header counters, flush, and release the pool.
    pub fn close(mut self) -> DbResult<()> {
        self.pool.pin(0)?;
        let result = self.schema.encode_header(
            self.num_records as i32,
            self.free_page_hint as i32,
            self.pool.page_mut(0)?,
        );
        if result.is_ok() {
            self.pool.mark_dirty(0)?;
        }
        self.pool.unpin(0)?;
        result?;
        self.pool.shutdown()
    }

    /// Remove the table file at `path`.
    pub fn destroy(path: &Path) -> DbResult<()> {
        PageFile::destroy(path)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of occupied slots across all data pages.
    pub fn num_records(&self) -> u32 {
        self.num_records
    }

    /// Insert `record`, assigning it the first free slot at or after the
    /// free-page hint. The record's `id` is updated in place.
    pub fn insert(&mut self, record: &mut Record) -> DbResult<RecordId> {
        let size = self.schema.record_size();
        if record.data.len() != size {
            return Err(DbError::InvalidParameter(format!(
                "record image is {} bytes, schema wants {size}",
                record.data.len()
            )));
        }
        let slots = self.schema.slots_per_page();

        let mut page_num = self.free_page_hint.max(1);
        loop {
            self.pool.pin(page_num)?;
            let page = self.pool.page_mut(page_num)?;
            let free = (0..slots).find(|&s| page[s * size] != TOMBSTONE_LIVE);
            match free {
                Some(slot) => {
                    let off = slot * size;
                    page[off] = TOMBSTONE_LIVE;
                    page[off + 1..off + size].copy_from_slice(&record.data[1..]);
                    self.pool.mark_dirty(page_num)?;
                    self.pool.unpin(page_num)?;

                    record.id = RecordId::new(page_num as i32, slot as i32);
                    self.num_records += 1;
                    self.free_page_hint = page_num;
                    return Ok(record.id);
                }
                None => {
                    self.pool.unpin(page_num)?;
                    page_num += 1;
                    trace!("page {} full, trying page {page_num}", page_num - 1);
                }
            }
        }
    }

    /// Fetch the record at `rid`.
    pub fn get(&mut self, rid: RecordId) -> DbResult<Record> {
        let (page_num, slot) = self.locate(rid)?;
        let size = self.schema.record_size();

        self.pool.pin(page_num)?;
        let result = (|| {
            let page = self.pool.page(page_num)?;
            let off = slot * size;
            if page[off] != TOMBSTONE_LIVE {
                return Err(DbError::NoRecordAtRid(rid));
            }
            Ok(Record {
                id: rid,
                data: page[off..off + size].to_vec(),
            })
        })();
        self.pool.unpin(page_num)?;
        result
    }

    /// Tombstone the record at `rid` and bias future inserts toward the
    /// freed page.
    pub fn delete(&mut self, rid: RecordId) -> DbResult<()> {
        let (page_num, slot) = self.locate(rid)?;
        let size = self.schema.record_size();

        self.pool.pin(page_num)?;
        let result = (|| {
            let page = self.pool.page_mut(page_num)?;
            let off = slot * size;
            if page[off] != TOMBSTONE_LIVE {
                return Err(DbError::NoRecordAtRid(rid));
            }
            page[off] = TOMBSTONE_DEAD;
            Ok(())
        })();
        if result.is_ok() {
            self.pool.mark_dirty(page_num)?;
        }
        self.pool.unpin(page_num)?;
        result?;

        self.num_records -= 1;
        self.free_page_hint = page_num;
        Ok(())
    }

    /// Overwrite the record at `record.id` with `record`'s body.
    pub fn update(&mut self, record: &Record) -> DbResult<()> {
        let (page_num, slot) = self.locate(record.id)?;
        let size = self.schema.record_size();
        if record.data.len() != size {
            return Err(DbError::InvalidParameter(format!(
                "record image is {} bytes, schema wants {size}",
                record.data.len()
            )));
        }

        self.pool.pin(page_num)?;
        let result = (|| {
            let page = self.pool.page_mut(page_num)?;
            let off = slot * size;
            if page[off] != TOMBSTONE_LIVE {
                return Err(DbError::NoRecordAtRid(record.id));
            }
            page[off] = TOMBSTONE_LIVE;
            page[off + 1..off + size].copy_from_slice(&record.data[1..]);
            Ok(())
        })();
        if result.is_ok() {
            self.pool.mark_dirty(page_num)?;
        }
        self.pool.unpin(page_num)?;
        result
    }

    /// Start a predicate-driven scan over this table's slots.
    pub fn scan(&mut self, predicate: Expr) -> Scan<'_> {
        Scan::new(self, predicate)
    }

    /// Validate `rid` against the schema geometry and the file size.
    fn locate(&self, rid: RecordId) -> DbResult<(PageNum, usize)> {
        let slots = self.schema.slots_per_page();
        if rid.page < 1 || rid.slot < 0 || rid.slot as usize >= slots {
            return Err(DbError::InvalidParameter(format!("bad record id {rid}")));
        }
        let page_num = rid.page as PageNum;
        if page_num >= self.pool.total_pages() {
            return Err(DbError::NoRecordAtRid(rid));
        }
        Ok((page_num, rid.slot as usize))
    }

    pub(crate) fn pool(&mut self) -> &mut BufferPool {
        &mut self.pool
    }

    pub(crate) fn pool_total_pages(&self) -> PageNum {
        self.pool.total_pages()
    }
}

/// Render `records` as a table under the schema's attribute names, for
/// diagnostics and test output.
pub fn render_records(schema: &Schema, records: &[Record]) -> DbResult<String> {
    let rows = records
        .iter()
        .map(|r| r.decode_all(schema))
        .collect::<DbResult<Vec<_>>>()?;
    Ok(common::pretty::render_table(&schema.column_names(), &rows))
}
