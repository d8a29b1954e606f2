use super::*;
use tempfile::tempdir;

#[test]
fn create_produces_one_zero_page() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.bin");

    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();
    assert_eq!(file.total_pages(), 1);

    let mut buf = vec![0xffu8; PAGE_SIZE];
    file.read_page(0, &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn write_read_round_trip_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.bin");

    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();
    file.append_empty_page().unwrap();
    file.append_empty_page().unwrap();
    file.append_empty_page().unwrap();

    let payload = vec![0x41u8; PAGE_SIZE];
    file.write_page(2, &payload).unwrap();
    file.close().unwrap();

    let mut file = PageFile::open(&path).unwrap();
    assert_eq!(file.total_pages(), 4);
    let mut out = vec![0u8; PAGE_SIZE];
    file.read_page(2, &mut out).unwrap();
    assert_eq!(out, payload);
}

#[test]
fn append_on_fresh_file_yields_two_pages() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.bin");

    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();
    file.append_empty_page().unwrap();
    assert_eq!(file.total_pages(), 2);
}

#[test]
fn reads_reject_out_of_range_pages() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.bin");

    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();

    let mut buf = vec![0u8; PAGE_SIZE];
    let err = file.read_page(1, &mut buf).unwrap_err();
    assert!(matches!(err, DbError::PageOutOfRange(1)));

    let err = file.write_page(5, &buf).unwrap_err();
    assert!(matches!(err, DbError::PageOutOfRange(5)));
}

#[test]
fn page_buffers_must_be_exactly_one_page() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.bin");

    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();

    let mut short = vec![0u8; PAGE_SIZE - 1];
    let err = file.read_page(0, &mut short).unwrap_err();
    assert!(matches!(err, DbError::InvalidParameter(_)));
}

#[test]
fn ensure_capacity_grows_once_and_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.bin");

    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();

    file.ensure_capacity(0).unwrap();
    assert_eq!(file.total_pages(), 1);

    file.ensure_capacity(5).unwrap();
    assert_eq!(file.total_pages(), 5);

    file.ensure_capacity(5).unwrap();
    assert_eq!(file.total_pages(), 5);

    // The grown tail is readable and zeroed.
    let mut buf = vec![0x55u8; PAGE_SIZE];
    file.read_page(4, &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn file_length_is_page_aligned() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.bin");

    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();
    file.append_empty_page().unwrap();
    file.ensure_capacity(7).unwrap();
    file.close().unwrap();

    let len = std::fs::metadata(&path).unwrap().len();
    assert_eq!(len % PAGE_SIZE as u64, 0);
    assert_eq!(len, 7 * PAGE_SIZE as u64);
}

#[test]
fn positional_reads_walk_pages_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.bin");

    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();
    file.ensure_capacity(3).unwrap();

    // Stamp each page with its own index.
    for i in 0..3u32 {
        let mut buf = vec![0u8; PAGE_SIZE];
        buf[0] = i as u8;
        file.write_page(i, &buf).unwrap();
    }

    let mut buf = vec![0u8; PAGE_SIZE];
    file.read_first(&mut buf).unwrap();
    assert_eq!(buf[0], 0);
    file.read_next(&mut buf).unwrap();
    assert_eq!(buf[0], 1);
    file.read_next(&mut buf).unwrap();
    assert_eq!(buf[0], 2);
    assert_eq!(file.cursor(), 2);

    let err = file.read_next(&mut buf).unwrap_err();
    assert!(matches!(err, DbError::PageOutOfRange(3)));

    file.read_previous(&mut buf).unwrap();
    assert_eq!(buf[0], 1);
    file.read_current(&mut buf).unwrap();
    assert_eq!(buf[0], 1);

    file.read_last(&mut buf).unwrap();
    assert_eq!(buf[0], 2);

    file.read_first(&mut buf).unwrap();
    let err = file.read_previous(&mut buf).unwrap_err();
    assert!(matches!(err, DbError::PageOutOfRange(-1)));
}

#[test]
fn destroy_removes_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.bin");

    PageFile::create(&path).unwrap();
    PageFile::destroy(&path).unwrap();
    assert!(!path.exists());

    let err = PageFile::destroy(&path).unwrap_err();
    assert!(matches!(err, DbError::FileNotFound(_)));
}

#[test]
fn open_missing_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.bin");

    let err = PageFile::open(&path).unwrap_err();
    assert!(matches!(err, DbError::FileNotFound(_)));
}
