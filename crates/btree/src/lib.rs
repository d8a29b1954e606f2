//! Index manager: an ordered `i32` key → record-id map on paged storage.
//!
//! The structure is deliberately flat: each node page holds at most two
//! keys, and a full tail node spills to a fresh page instead of
//! splitting, so the index grows as a chain of key pairs. Lookups and
//! deletes walk the node pages linearly. Page 0 of an index file carries
//! the declared order; nodes occupy pages 1 onward, one per page.


mod node;

pub use node::{EMPTY_KEY, Node};

use std::path::Path;

use buffer::{BufferPool, ReplacementPolicy};
use bytes::{Buf, BufMut};
use common::{Config, DbError, DbResult, PageNum, RecordId};
use log::trace;
use storage::{PAGE_SIZE, PageFile};
use types::AttrType;

/// Which key slot of a node a lookup landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
    First,
    Second,
}

/// An open index over integer keys.
#[derive(Debug)]
pub struct BTreeIndex {
    pool: BufferPool,
    order: u32,
    root: PageNum,
    last_page: PageNum,
    entries: u32,
}

impl BTreeIndex {
    /// Create an index file at `path` for keys of `key_type` with the
    /// declared order `order`.
    ///
    /// Only INT keys are supported.
    pub fn create(path: &Path, key_type: AttrType, order: u32) -> DbResult<()> {
        if key_type != AttrType::Int {
            return Err(DbError::UnsupportedKeyType(key_type));
        }
        if order == 0 {
            return Err(DbError::InvalidParameter("index order must be positive".into()));
        }
        PageFile::create(path)?;
        let mut file = PageFile::open(path)?;
        let mut page = vec![0u8; PAGE_SIZE];
        {
            let mut cur = &mut page[..];
            cur.put_i32_ne(order as i32);
        }
        file.write_page(0, &page)?;
        file.close()
    }

    /// Open the index at `path` with default configuration.
    pub fn open(path: &Path) -> DbResult<Self> {
        Self::open_with(path, &Config::default())
    }

    /// Open the index at `path`, sizing its buffer pool from `config`.
    ///
    /// The in-memory view starts blind: no root, no entries, no node
    /// pages. Inserts rebuild the chain from page 1.
    pub fn open_with(path: &Path, config: &Config) -> DbResult<Self> {
        let mut pool = BufferPool::open(path, config.index_pool_pages, ReplacementPolicy::Fifo)?;
        pool.pin(0)?;
        let order = {
            let mut cur = pool.page(0)?;
            cur.get_i32_ne()
        };
        pool.unpin(0)?;
        if order <= 0 {
            return Err(DbError::InvalidParameter(format!(
                "index file carries order {order}"
            )));
        }
        Ok(Self {
            pool,
            order: order as u32,
            root: 0,
            last_page: 0,
            entries: 0,
        })
    }

    /// Flush and release the pool.
    pub fn close(mut self) -> DbResult<()> {
        self.pool.shutdown()
    }

    /// Remove the index file at `path`.
    pub fn destroy(path: &Path) -> DbResult<()> {
        PageFile::destroy(path)
    }

    /// Declared order from the file header.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Keys currently held.
    pub fn entries(&self) -> u32 {
        self.entries
    }

    /// Node pages currently occupied.
    pub fn nodes(&self) -> u32 {
        self.last_page
    }

    /// Root node page, 0 while the index is empty.
    pub fn root(&self) -> PageNum {
        self.root
    }

    /// Insert `key` referencing `rid`.
    ///
    /// The key lands in the tail node's free slot, or in a fresh node
    /// page once the tail is full.
    pub fn insert(&mut self, key: i32, rid: RecordId) -> DbResult<()> {
        if self.last_page == 0 {
            let mut fresh = Node::leaf();
            fresh.left = rid;
            fresh.value1 = key;
            self.write_node(1, false, &fresh)?;
            self.last_page = 1;
            self.root = 1;
            trace!("index seeded with node page 1");
        } else {
            let tail = self.last_page;
            let (full, mut node) = self.read_node(tail)?;
            if full {
                let next = tail + 1;
                let mut fresh = Node::leaf();
                fresh.left = rid;
                fresh.value1 = key;
                self.write_node(next, false, &fresh)?;
                self.last_page = next;
                trace!("tail node {tail} full, spilled to page {next}");
            } else {
                node.mid = rid;
                node.value2 = key;
                self.write_node(tail, true, &node)?;
            }
        }
        self.entries += 1;
        Ok(())
    }

    /// Look up the record id paired with `key`.
    pub fn find(&mut self, key: i32) -> DbResult<RecordId> {
        let (page, pos) = self.locate(key)?;
        let (_, node) = self.read_node(page)?;
        Ok(match pos {
            Position::First => node.left,
            Position::Second => node.mid,
        })
    }

    /// Remove `key`, refilling the vacated slot from the tail node.
    pub fn delete(&mut self, key: i32) -> DbResult<()> {
        let (found_page, pos) = self.locate(key)?;
        let (last_full, mut last_node) = self.read_node(self.last_page)?;

        if found_page == self.last_page {
            match pos {
                Position::First if last_full => {
                    last_node.value1 = last_node.value2;
                    last_node.left = last_node.mid;
                    last_node.value2 = EMPTY_KEY;
                    last_node.mid = RecordId::NONE;
                    self.write_node(found_page, false, &last_node)?;
                }
                Position::First => {
                    last_node.value1 = EMPTY_KEY;
                    last_node.left = RecordId::NONE;
                    self.write_node(found_page, false, &last_node)?;
                    self.last_page -= 1;
                }
                Position::Second => {
                    last_node.value2 = EMPTY_KEY;
                    last_node.mid = RecordId::NONE;
                    self.write_node(found_page, false, &last_node)?;
                }
            }
        } else {
            // Relocate the tail entry into the vacated slot.
            let (tail_key, tail_rid) = if last_full {
                let entry = (last_node.value2, last_node.mid);
                last_node.value2 = EMPTY_KEY;
                last_node.mid = RecordId::NONE;
                self.write_node(self.last_page, false, &last_node)?;
                entry
            } else {
                let entry = (last_node.value1, last_node.left);
                last_node.value1 = EMPTY_KEY;
                last_node.left = RecordId::NONE;
                self.write_node(self.last_page, false, &last_node)?;
                self.last_page -= 1;
                entry
            };

            let (_, mut found) = self.read_node(found_page)?;
            match pos {
                Position::First => {
                    found.value1 = tail_key;
                    found.left = tail_rid;
                }
                Position::Second => {
                    found.value2 = tail_key;
                    found.mid = tail_rid;
                }
            }
            let full = found.has_value1() && found.has_value2();
            self.write_node(found_page, full, &found)?;
        }

        self.entries -= 1;
        Ok(())
    }

    /// Start an ascending scan over all keys.
    pub fn scan(&mut self) -> DbResult<IndexScan<'_>> {
        let mut keys = Vec::with_capacity(self.entries as usize);
        for page in 1..=self.last_page {
            let (_, node) = self.read_node(page)?;
            if node.has_value1() {
                keys.push(node.value1);
            }
            if node.has_value2() {
                keys.push(node.value2);
            }
        }
        keys.sort_unstable();
        Ok(IndexScan {
            tree: self,
            keys,
            pos: 0,
        })
    }

    /// Walk the node chain for `key`, returning its page and slot.
    fn locate(&mut self, key: i32) -> DbResult<(PageNum, Position)> {
        for page in 1..=self.last_page {
            let (_, node) = self.read_node(page)?;
            if node.value1 == key {
                return Ok((page, Position::First));
            }
            if node.value2 == key {
                return Ok((page, Position::Second));
            }
        }
        Err(DbError::KeyNotFound(key))
    }

    fn read_node(&mut self, page: PageNum) -> DbResult<(bool, Node)> {
        self.pool.pin(page)?;
        let decoded = self.pool.page(page).map(|bytes| Node::decode(bytes));
        self.pool.unpin(page)?;
        decoded
    }

    fn write_node(&mut self, page: PageNum, full: bool, node: &Node) -> DbResult<()> {
        self.pool.pin(page)?;
        let result = self.pool.page_mut(page).map(|bytes| node.encode(full, bytes));
        if result.is_ok() {
            self.pool.mark_dirty(page)?;
        }
        self.pool.unpin(page)?;
        result
    }
}

/// An in-order traversal of the index's keys.
///
/// The key set is captured at open time and each step resolves its key
/// through [`BTreeIndex::find`], so entries deleted mid-scan surface as
/// errors rather than stale record ids.
#[derive(Debug)]
pub struct IndexScan<'t> {
    tree: &'t mut BTreeIndex,
    keys: Vec<i32>,
    pos: usize,
}

impl IndexScan<'_> {
    /// The record id of the next key in ascending order, or `Ok(None)`
    /// when exhausted.
    pub fn next(&mut self) -> DbResult<Option<RecordId>> {
        if self.pos >= self.keys.len() {
            return Ok(None);
        }
        let key = self.keys[self.pos];
        self.pos += 1;
        self.tree.find(key).map(Some)
    }
}
