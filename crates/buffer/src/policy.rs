//! Victim selection for page replacement.
//!
//! All policies consider only occupied, unpinned frames.

use crate::Frame;

/// Page-replacement policy of a buffer pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// Evict the frame whose page was installed earliest.
    Fifo,
    /// Evict the frame pinned least recently; ties break on the smaller
    /// page index.
    Lru,
    /// Second chance: a set reference bit buys one sweep of the hand.
    Clock,
    /// Evict the frame pinned fewest times; ties break on the older pin.
    Lfu,
}

/// Pick a victim frame index, or `None` when every frame is pinned.
pub(crate) fn select_victim(
    policy: ReplacementPolicy,
    frames: &mut [Frame],
    clock_hand: &mut usize,
) -> Option<usize> {
    match policy {
        ReplacementPolicy::Fifo => min_unpinned_by_key(frames, |f| f.installed_at),
        ReplacementPolicy::Lru => {
            min_unpinned_by_key(frames, |f| (f.last_used, f.page.unwrap_or(0)))
        }
        ReplacementPolicy::Lfu => min_unpinned_by_key(frames, |f| (f.use_count, f.last_used)),
        ReplacementPolicy::Clock => clock_sweep(frames, clock_hand),
    }
}

fn min_unpinned_by_key<K: Ord>(frames: &[Frame], key: impl Fn(&Frame) -> K) -> Option<usize> {
    frames
        .iter()
        .enumerate()
        .filter(|(_, f)| f.page.is_some() && f.pin_count == 0)
        .min_by_key(|(_, f)| key(f))
        .map(|(idx, _)| idx)
}

/// Advance the hand, clearing reference bits, until an unreferenced
/// unpinned frame comes up. Two full sweeps with no candidate means every
/// frame is pinned.
fn clock_sweep(frames: &mut [Frame], hand: &mut usize) -> Option<usize> {
    let n = frames.len();
    for _ in 0..2 * n {
        let idx = *hand;
        *hand = (*hand + 1) % n;

        let frame = &mut frames[idx];
        if frame.page.is_none() || frame.pin_count > 0 {
            continue;
        }
        if frame.referenced {
            frame.referenced = false;
            continue;
        }
        return Some(idx);
    }
    None
}
