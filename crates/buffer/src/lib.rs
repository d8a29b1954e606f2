//! Buffer pool manager for page-level caching and I/O.
//!
//! The pool sits between the storage layer and the record/index managers,
//! providing:
//! - a fixed set of in-memory frames over one page file
//! - a pin/unpin protocol: a page's bytes stay valid while its fix count
//!   is above zero, and only unpinned frames are eviction candidates
//! - dirty tracking with write-back before replacement or on flush
//! - pluggable replacement (FIFO, LRU, CLOCK, LFU) and disk I/O counters
//!
//! # Example
//!
//! ```no_run
//! use buffer::{BufferPool, ReplacementPolicy};
//! use std::path::Path;
//!
//! let path = Path::new("/tmp/table.bin");
//! let mut pool = BufferPool::open(path, 16, ReplacementPolicy::Lru).unwrap();
//!
//! pool.pin(3).unwrap();
//! pool.page_mut(3).unwrap()[0] = 42;
//! pool.mark_dirty(3).unwrap();
//! pool.unpin(3).unwrap();
//!
//! pool.flush_all().unwrap();
//! ```

#[cfg(test)]
mod tests;

mod policy;

pub use policy::ReplacementPolicy;

use hashbrown::HashMap;
use log::{debug, trace};
use std::path::Path;

use common::{DbError, DbResult, PageNum};
use storage::{PAGE_SIZE, PageFile};

/// Sentinel reported by [`BufferPool::frame_contents`] for an empty frame.
pub const NO_PAGE: i32 = -1;

/// One memory-resident page plus its bookkeeping.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) page: Option<PageNum>,
    pub(crate) data: Vec<u8>,
    pub(crate) dirty: bool,
    pub(crate) pin_count: u32,
    /// Tick of the most recent pin (LRU victim order, LFU tie-break).
    pub(crate) last_used: u64,
    /// Pins since installation (LFU victim order).
    pub(crate) use_count: u64,
    /// Second-chance bit (CLOCK).
    pub(crate) referenced: bool,
    /// Installation sequence number (FIFO victim order).
    pub(crate) installed_at: u64,
}

impl Frame {
    fn empty() -> Self {
        Self {
            page: None,
            data: vec![0u8; PAGE_SIZE],
            dirty: false,
            pin_count: 0,
            last_used: 0,
            use_count: 0,
            referenced: false,
            installed_at: 0,
        }
    }

    fn clear(&mut self) {
        self.page = None;
        self.dirty = false;
        self.pin_count = 0;
        self.last_used = 0;
        self.use_count = 0;
        self.referenced = false;
        self.installed_at = 0;
    }
}

/// A fixed-capacity page cache over one page file.
///
/// The pool owns the underlying [`PageFile`] for its whole lifetime; all
/// reads and writes of that file go through the pool.
#[derive(Debug)]
pub struct BufferPool {
    file: PageFile,
    frames: Vec<Frame>,
    resident: HashMap<PageNum, usize>,
    policy: ReplacementPolicy,
    tick: u64,
    installs: u64,
    clock_hand: usize,
    reads: u64,
    writes: u64,
}

impl BufferPool {
    /// Open a pool of `capacity` frames over the page file at `path`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn open(path: &Path, capacity: usize, policy: ReplacementPolicy) -> DbResult<Self> {
        assert!(capacity > 0, "capacity must be > 0");
        let file = PageFile::open(path)?;
        Ok(Self {
            file,
            frames: (0..capacity).map(|_| Frame::empty()).collect(),
            resident: HashMap::with_capacity(capacity),
            policy,
            tick: 0,
            installs: 0,
            clock_hand: 0,
            reads: 0,
            writes: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// Pages currently backing the file (grows as pins reach past EOF).
    pub fn total_pages(&self) -> PageNum {
        self.file.total_pages()
    }

    /// Pin `page`, faulting it in from disk if necessary.
    ///
    /// On a hit the fix count is incremented in place. On a miss an empty
    /// frame is used if one exists; otherwise the policy selects a victim
    /// among unpinned frames (writing it back first when dirty). Pinning a
    /// page index beyond end-of-file grows the file with zero pages.
    pub fn pin(&mut self, page: PageNum) -> DbResult<()> {
        self.tick += 1;
        if let Some(&idx) = self.resident.get(&page) {
            let frame = &mut self.frames[idx];
            frame.pin_count += 1;
            frame.last_used = self.tick;
            frame.use_count += 1;
            frame.referenced = true;
            trace!("pin hit: page {page} in frame {idx}");
            return Ok(());
        }

        let idx = self.take_frame()?;
        self.file.ensure_capacity(page + 1)?;
        self.file.read_page(page, &mut self.frames[idx].data)?;
        self.reads += 1;
        self.installs += 1;

        let tick = self.tick;
        let installs = self.installs;
        let frame = &mut self.frames[idx];
        frame.page = Some(page);
        frame.dirty = false;
        frame.pin_count = 1;
        frame.last_used = tick;
        frame.use_count = 1;
        frame.referenced = true;
        frame.installed_at = installs;
        self.resident.insert(page, idx);
        trace!("pin miss: installed page {page} in frame {idx}");
        Ok(())
    }

    /// Drop one pin on `page`.
    pub fn unpin(&mut self, page: PageNum) -> DbResult<()> {
        let idx = self.frame_of(page)?;
        let frame = &mut self.frames[idx];
        if frame.pin_count == 0 {
            return Err(DbError::Buffer(format!("page {page} is not pinned")));
        }
        frame.pin_count -= 1;
        Ok(())
    }

    /// Flag `page`'s frame as modified.
    pub fn mark_dirty(&mut self, page: PageNum) -> DbResult<()> {
        let idx = self.frame_of(page)?;
        self.frames[idx].dirty = true;
        Ok(())
    }

    /// Borrow the bytes of a pinned page.
    pub fn page(&self, page: PageNum) -> DbResult<&[u8]> {
        let idx = self.pinned_frame_of(page)?;
        Ok(&self.frames[idx].data)
    }

    /// Mutably borrow the bytes of a pinned page.
    ///
    /// Callers that modify the bytes must also call [`BufferPool::mark_dirty`].
    pub fn page_mut(&mut self, page: PageNum) -> DbResult<&mut [u8]> {
        let idx = self.pinned_frame_of(page)?;
        Ok(&mut self.frames[idx].data)
    }

    /// Write `page`'s frame to disk unconditionally and mark it clean.
    pub fn force_page(&mut self, page: PageNum) -> DbResult<()> {
        let idx = self.frame_of(page)?;
        self.file.write_page(page, &self.frames[idx].data)?;
        self.writes += 1;
        self.frames[idx].dirty = false;
        debug!("forced page {page} to disk");
        Ok(())
    }

    /// Write back every dirty, unpinned frame. Pinned dirty frames are
    /// skipped without error.
    pub fn flush_all(&mut self) -> DbResult<()> {
        for idx in 0..self.frames.len() {
            let Some(page) = self.frames[idx].page else {
                continue;
            };
            if self.frames[idx].pin_count == 0 && self.frames[idx].dirty {
                self.file.write_page(page, &self.frames[idx].data)?;
                self.writes += 1;
                self.frames[idx].dirty = false;
                debug!("flushed page {page} from frame {idx}");
            }
        }
        Ok(())
    }

    /// Flush and release every frame.
    ///
    /// Fails with [`DbError::PinnedPagesInBuffer`] while any fix count is
    /// nonzero; the pool stays usable so the caller can unpin and retry.
    pub fn shutdown(&mut self) -> DbResult<()> {
        self.flush_all()?;
        if self.frames.iter().any(|f| f.pin_count > 0) {
            return Err(DbError::PinnedPagesInBuffer);
        }
        for frame in &mut self.frames {
            frame.clear();
        }
        self.resident.clear();
        debug!("pool over {:?} shut down", self.file.path());
        Ok(())
    }

    /// Page index held by each frame, in frame order; [`NO_PAGE`] for empty.
    pub fn frame_contents(&self) -> Vec<i32> {
        self.frames
            .iter()
            .map(|f| f.page.map_or(NO_PAGE, |p| p as i32))
            .collect()
    }

    /// Dirty flag of each frame, in frame order.
    pub fn dirty_flags(&self) -> Vec<bool> {
        self.frames.iter().map(|f| f.dirty).collect()
    }

    /// Fix count of each frame, in frame order.
    pub fn fix_counts(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.pin_count).collect()
    }

    /// Pages read from disk since the pool was opened.
    pub fn read_io(&self) -> u64 {
        self.reads
    }

    /// Pages written to disk since the pool was opened.
    pub fn write_io(&self) -> u64 {
        self.writes
    }

    fn frame_of(&self, page: PageNum) -> DbResult<usize> {
        self.resident
            .get(&page)
            .copied()
            .ok_or_else(|| DbError::Buffer(format!("page {page} is not resident")))
    }

    fn pinned_frame_of(&self, page: PageNum) -> DbResult<usize> {
        let idx = self.frame_of(page)?;
        if self.frames[idx].pin_count == 0 {
            return Err(DbError::Buffer(format!("page {page} is not pinned")));
        }
        Ok(idx)
    }

    /// Find a frame to install into: an empty one, or an evicted victim.
    fn take_frame(&mut self) -> DbResult<usize> {
        if let Some(idx) = self.frames.iter().position(|f| f.page.is_none()) {
            return Ok(idx);
        }
        let idx = policy::select_victim(self.policy, &mut self.frames, &mut self.clock_hand)
            .ok_or_else(|| DbError::Buffer("no unpinned frame available".into()))?;
        self.evict(idx)?;
        Ok(idx)
    }

    /// Write back (if dirty) and empty the frame at `idx`.
    fn evict(&mut self, idx: usize) -> DbResult<()> {
        let Some(page) = self.frames[idx].page else {
            return Ok(());
        };
        if self.frames[idx].dirty {
            self.file.write_page(page, &self.frames[idx].data)?;
            self.writes += 1;
            debug!("evicting dirty page {page} from frame {idx}");
        } else {
            trace!("evicting clean page {page} from frame {idx}");
        }
        self.resident.remove(&page);
        self.frames[idx].clear();
        Ok(())
    }
}
