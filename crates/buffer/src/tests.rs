use super::*;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

fn page_file(dir: &TempDir, name: &str, pages: PageNum) -> PathBuf {
    let path = dir.path().join(name);
    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();
    file.ensure_capacity(pages).unwrap();
    file.close().unwrap();
    path
}

#[test]
fn lru_eviction_order_matches_access_history() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 8);
    let mut pool = BufferPool::open(&path, 3, ReplacementPolicy::Lru).unwrap();

    for page in [1, 2, 3] {
        pool.pin(page).unwrap();
        pool.unpin(page).unwrap();
    }

    // Oldest unpinned page (1) makes way.
    pool.pin(4).unwrap();
    pool.unpin(4).unwrap();

    // Hit on 2 makes it most recent.
    pool.pin(2).unwrap();
    pool.unpin(2).unwrap();

    // Now 3 is the oldest unpinned page.
    pool.pin(5).unwrap();
    pool.unpin(5).unwrap();

    assert_eq!(pool.frame_contents(), vec![4, 2, 5]);
    assert_eq!(pool.read_io(), 5);
    assert_eq!(pool.write_io(), 0);
}

#[test]
fn fifo_evicts_in_installation_order() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 8);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Fifo).unwrap();

    pool.pin(0).unwrap();
    pool.unpin(0).unwrap();
    pool.pin(1).unwrap();
    pool.unpin(1).unwrap();

    // A hit does not refresh FIFO order.
    pool.pin(0).unwrap();
    pool.unpin(0).unwrap();

    pool.pin(2).unwrap();
    pool.unpin(2).unwrap();

    assert_eq!(pool.frame_contents(), vec![2, 1]);
}

#[test]
fn clock_grants_one_second_chance() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 8);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Clock).unwrap();

    pool.pin(0).unwrap();
    pool.unpin(0).unwrap();
    pool.pin(1).unwrap();
    pool.unpin(1).unwrap();

    // Both reference bits are set; the sweep clears them and comes back
    // around to frame 0.
    pool.pin(2).unwrap();
    pool.unpin(2).unwrap();
    assert_eq!(pool.frame_contents(), vec![2, 1]);

    // Frame 1's bit was cleared by the previous sweep.
    pool.pin(3).unwrap();
    pool.unpin(3).unwrap();
    assert_eq!(pool.frame_contents(), vec![2, 3]);
}

#[test]
fn lfu_evicts_least_frequently_pinned() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 8);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Lfu).unwrap();

    pool.pin(0).unwrap();
    pool.unpin(0).unwrap();
    pool.pin(0).unwrap();
    pool.unpin(0).unwrap();

    pool.pin(1).unwrap();
    pool.unpin(1).unwrap();

    pool.pin(2).unwrap();
    pool.unpin(2).unwrap();

    assert_eq!(pool.frame_contents(), vec![0, 2]);
}

#[test]
fn pinned_frames_are_never_victims() {
    for policy in [
        ReplacementPolicy::Fifo,
        ReplacementPolicy::Lru,
        ReplacementPolicy::Clock,
        ReplacementPolicy::Lfu,
    ] {
        let dir = tempdir().unwrap();
        let path = page_file(&dir, "t.bin", 8);
        let mut pool = BufferPool::open(&path, 2, policy).unwrap();

        pool.pin(0).unwrap();
        pool.pin(1).unwrap();

        let err = pool.pin(2).unwrap_err();
        assert!(
            matches!(err, DbError::Buffer(_)),
            "{policy:?} should fail cleanly with all frames pinned"
        );

        // Freeing one frame unblocks the pool.
        pool.unpin(1).unwrap();
        pool.pin(2).unwrap();
        pool.unpin(2).unwrap();
        pool.unpin(0).unwrap();
    }
}

#[test]
fn eviction_writes_dirty_pages_back() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 8);
    let mut pool = BufferPool::open(&path, 1, ReplacementPolicy::Lru).unwrap();

    pool.pin(0).unwrap();
    pool.page_mut(0).unwrap()[0] = 99;
    pool.mark_dirty(0).unwrap();
    pool.unpin(0).unwrap();

    // Evicts page 0, forcing a write-back.
    pool.pin(1).unwrap();
    pool.unpin(1).unwrap();
    assert_eq!(pool.write_io(), 1);

    // The modification survived the round trip.
    pool.pin(0).unwrap();
    assert_eq!(pool.page(0).unwrap()[0], 99);
    assert!(!pool.dirty_flags()[0]);
    pool.unpin(0).unwrap();
    assert_eq!(pool.read_io(), 3);
}

#[test]
fn hit_leaves_io_counters_untouched() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 4);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Lru).unwrap();

    pool.pin(0).unwrap();
    pool.unpin(0).unwrap();
    assert_eq!(pool.read_io(), 1);

    pool.pin(0).unwrap();
    pool.unpin(0).unwrap();
    assert_eq!(pool.read_io(), 1);
    assert_eq!(pool.write_io(), 0);
}

#[test]
fn force_page_writes_even_when_clean() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 4);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Lru).unwrap();

    pool.pin(0).unwrap();
    pool.page_mut(0).unwrap()[7] = 0x41;
    pool.force_page(0).unwrap();
    assert_eq!(pool.write_io(), 1);
    assert!(!pool.dirty_flags()[0]);
    pool.unpin(0).unwrap();

    let mut file = PageFile::open(&path).unwrap();
    let mut buf = vec![0u8; PAGE_SIZE];
    file.read_page(0, &mut buf).unwrap();
    assert_eq!(buf[7], 0x41);
}

#[test]
fn flush_skips_pinned_dirty_frames() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 4);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Lru).unwrap();

    pool.pin(0).unwrap();
    pool.page_mut(0).unwrap()[0] = 1;
    pool.mark_dirty(0).unwrap();

    pool.flush_all().unwrap();
    assert_eq!(pool.write_io(), 0);
    assert!(pool.dirty_flags()[0]);

    pool.unpin(0).unwrap();
    pool.flush_all().unwrap();
    assert_eq!(pool.write_io(), 1);
    assert!(!pool.dirty_flags()[0]);
}

#[test]
fn shutdown_refuses_while_pins_remain() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 4);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Lru).unwrap();

    pool.pin(0).unwrap();
    let err = pool.shutdown().unwrap_err();
    assert!(matches!(err, DbError::PinnedPagesInBuffer));

    // The pool is still usable after the failed shutdown.
    pool.unpin(0).unwrap();
    pool.shutdown().unwrap();
    assert!(pool.frame_contents().iter().all(|&p| p == NO_PAGE));
}

#[test]
fn shutdown_flushes_unpinned_dirty_frames() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 4);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Lru).unwrap();

    pool.pin(1).unwrap();
    pool.page_mut(1).unwrap()[0] = 0x5a;
    pool.mark_dirty(1).unwrap();
    pool.unpin(1).unwrap();
    pool.shutdown().unwrap();

    let mut file = PageFile::open(&path).unwrap();
    let mut buf = vec![0u8; PAGE_SIZE];
    file.read_page(1, &mut buf).unwrap();
    assert_eq!(buf[0], 0x5a);
}

#[test]
fn pinning_past_eof_grows_the_file_with_zero_pages() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 1);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Lru).unwrap();

    pool.pin(5).unwrap();
    assert_eq!(pool.total_pages(), 6);
    assert!(pool.page(5).unwrap().iter().all(|&b| b == 0));
    pool.unpin(5).unwrap();
}

#[test]
fn page_access_requires_a_pin() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 4);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Lru).unwrap();

    assert!(matches!(pool.page(0), Err(DbError::Buffer(_))));

    pool.pin(0).unwrap();
    pool.unpin(0).unwrap();
    // Resident but unpinned is still not accessible.
    assert!(matches!(pool.page(0), Err(DbError::Buffer(_))));
}

#[test]
fn unpin_underflow_and_unknown_pages_fail() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 4);
    let mut pool = BufferPool::open(&path, 2, ReplacementPolicy::Lru).unwrap();

    assert!(matches!(pool.unpin(3), Err(DbError::Buffer(_))));
    assert!(matches!(pool.mark_dirty(3), Err(DbError::Buffer(_))));
    assert!(matches!(pool.force_page(3), Err(DbError::Buffer(_))));

    pool.pin(0).unwrap();
    pool.unpin(0).unwrap();
    let err = pool.unpin(0).unwrap_err();
    assert!(matches!(err, DbError::Buffer(_)));
}

#[test]
fn introspection_reports_frame_state() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 4);
    let mut pool = BufferPool::open(&path, 3, ReplacementPolicy::Lru).unwrap();

    assert_eq!(pool.frame_contents(), vec![NO_PAGE; 3]);

    pool.pin(2).unwrap();
    pool.pin(2).unwrap();
    pool.pin(0).unwrap();
    pool.mark_dirty(0).unwrap();

    assert_eq!(pool.frame_contents(), vec![2, 0, NO_PAGE]);
    assert_eq!(pool.fix_counts(), vec![2, 1, 0]);
    assert_eq!(pool.dirty_flags(), vec![false, true, false]);

    pool.unpin(2).unwrap();
    pool.unpin(2).unwrap();
    pool.unpin(0).unwrap();
}

#[test]
#[should_panic(expected = "capacity must be > 0")]
fn zero_capacity_pool_panics() {
    let dir = tempdir().unwrap();
    let path = page_file(&dir, "t.bin", 1);
    let _pool = BufferPool::open(&path, 0, ReplacementPolicy::Lru);
}
