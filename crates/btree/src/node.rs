//! Index node definitions and the on-disk node codec.

use bytes::{Buf, BufMut};
use common::RecordId;

/// Sentinel for an unoccupied key slot.
pub const EMPTY_KEY: i32 = -1;

/// Encoded size of a node image: parent, leaf flag, and the interleaved
/// child/key fields.
pub(crate) const NODE_BYTES: usize = 37;

/// Byte offset of the node image within its page. The image sits one
/// node-length past the fullness flag at byte 0; readers and writers of
/// existing index files agree on this gap.
pub(crate) const NODE_OFFSET: usize = 1 + NODE_BYTES;

/// One index node: up to two keys with their record references.
///
/// Key slots holding [`EMPTY_KEY`] and references holding
/// [`RecordId::NONE`] are vacant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    pub parent: i32,
    pub is_leaf: bool,
    pub left: RecordId,
    pub value1: i32,
    pub mid: RecordId,
    pub value2: i32,
    pub right: RecordId,
}

impl Node {
    /// A vacant leaf with no parent.
    pub fn leaf() -> Self {
        Self {
            parent: EMPTY_KEY,
            is_leaf: true,
            left: RecordId::NONE,
            value1: EMPTY_KEY,
            mid: RecordId::NONE,
            value2: EMPTY_KEY,
            right: RecordId::NONE,
        }
    }

    pub fn has_value1(&self) -> bool {
        self.value1 != EMPTY_KEY
    }

    pub fn has_value2(&self) -> bool {
        self.value2 != EMPTY_KEY
    }

    pub fn is_empty(&self) -> bool {
        !self.has_value1() && !self.has_value2()
    }

    /// Decode `(is_full, node)` from a node page.
    pub(crate) fn decode(page: &[u8]) -> (bool, Self) {
        let full = page[0] != 0;
        let mut cur = &page[NODE_OFFSET..NODE_OFFSET + NODE_BYTES];
        let node = Self {
            parent: cur.get_i32_ne(),
            is_leaf: cur.get_u8() != 0,
            left: get_rid(&mut cur),
            value1: cur.get_i32_ne(),
            mid: get_rid(&mut cur),
            value2: cur.get_i32_ne(),
            right: get_rid(&mut cur),
        };
        (full, node)
    }

    /// Encode this node and its fullness flag into a node page.
    pub(crate) fn encode(&self, full: bool, page: &mut [u8]) {
        page[0] = full as u8;
        let mut cur = &mut page[NODE_OFFSET..NODE_OFFSET + NODE_BYTES];
        cur.put_i32_ne(self.parent);
        cur.put_u8(self.is_leaf as u8);
        put_rid(&mut cur, self.left);
        cur.put_i32_ne(self.value1);
        put_rid(&mut cur, self.mid);
        cur.put_i32_ne(self.value2);
        put_rid(&mut cur, self.right);
    }
}

fn get_rid(cur: &mut &[u8]) -> RecordId {
    let page = cur.get_i32_ne();
    let slot = cur.get_i32_ne();
    RecordId::new(page, slot)
}

fn put_rid(cur: &mut &mut [u8], rid: RecordId) {
    cur.put_i32_ne(rid.page);
    cur.put_i32_ne(rid.slot);
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::PAGE_SIZE;

    #[test]
    fn fresh_leaf_is_vacant() {
        let node = Node::leaf();
        assert!(node.is_leaf);
        assert!(node.is_empty());
        assert!(!node.has_value1());
        assert!(!node.has_value2());
    }

    #[test]
    fn codec_round_trips_through_a_page() {
        let mut node = Node::leaf();
        node.value1 = 10;
        node.left = RecordId::new(1, 0);
        node.value2 = 20;
        node.mid = RecordId::new(1, 1);

        let mut page = vec![0u8; PAGE_SIZE];
        node.encode(true, &mut page);

        let (full, back) = Node::decode(&page);
        assert!(full);
        assert_eq!(back, node);
    }

    #[test]
    fn image_leaves_the_flag_gap_intact() {
        let mut page = vec![0u8; PAGE_SIZE];
        let mut node = Node::leaf();
        node.value1 = 7;
        node.encode(false, &mut page);

        assert_eq!(page[0], 0);
        // The gap between the flag and the node image stays zeroed.
        assert!(page[1..NODE_OFFSET].iter().all(|&b| b == 0));
        // The image itself starts at the offset.
        assert!(page[NODE_OFFSET..NODE_OFFSET + NODE_BYTES].iter().any(|&b| b != 0));
    }
}
