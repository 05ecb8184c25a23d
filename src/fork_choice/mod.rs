//! In-memory fork-choice view over recently seen headers.
//!
//! The view tracks every header reachable within a bounded window, keyed by
//! hash, and maintains a pointer to the entry with the highest cumulative
//! total difficulty. It never touches storage: on restart it is rebuilt by
//! [`ForkChoiceView::reset_head`] followed by feeding in whatever headers
//! the execution engine already has on disk.

use std::collections::HashMap;

use crate::common::{BlockHash, BlockHeader, ChainHead};

/// A stored header plus its cumulative total difficulty and link state.
#[derive(Debug, Clone)]
struct Entry {
    header: BlockHeader,
    cumulative_total_difficulty: u128,
    /// `true` once this entry's ancestry is known back to an anchor, making
    /// it eligible to become the best head.
    linked: bool,
}

/// Tracks candidate chain tips and exposes the current best head by
/// total-difficulty fork choice.
#[derive(Debug, Default)]
pub struct ForkChoiceView {
    entries: HashMap<BlockHash, Entry>,
    /// Hash of the entry with the maximal cumulative total difficulty among
    /// linked entries. `None` only before the first `reset_head`.
    best: Option<BlockHash>,
    /// Children parked on a parent hash that hasn't arrived yet.
    parked_children: HashMap<BlockHash, Vec<BlockHash>>,
}

impl ForkChoiceView {
    /// Creates an empty view. Call [`reset_head`](Self::reset_head) before
    /// using it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the view and installs `head` as the sole anchor, with its
    /// declared total difficulty and the best pointer set to it.
    pub fn reset_head(&mut self, head: ChainHead) {
        self.entries.clear();
        self.parked_children.clear();

        let anchor = BlockHeader {
            parent_hash: BlockHash::ZERO,
            number: head.number(),
            hash: head.hash(),
            difficulty: 0,
            extra: Vec::new(),
        };

        self.entries.insert(
            head.hash(),
            Entry { header: anchor, cumulative_total_difficulty: head.total_difficulty, linked: true },
        );
        self.best = Some(head.hash());
    }

    /// Feeds every header in `headers` through [`add`](Self::add), in
    /// order. Adapter contracts in this crate deliver headers oldest-first
    /// so that each header's parent is already stored by the time it
    /// arrives; see `Config`'s resume documentation.
    pub fn add_all(&mut self, headers: impl IntoIterator<Item = BlockHeader>) {
        for header in headers {
            self.add(header);
        }
    }

    /// Computes and stores `header`'s cumulative total difficulty, updating
    /// the best pointer if appropriate, and returns the computed value so
    /// the caller can back-annotate a [`crate::common::Block`].
    ///
    /// If `header`'s parent is not yet stored, the header is parked: its
    /// cumulative value is provisional (just its own declared difficulty)
    /// and it is not eligible to become best until a later `add` links it
    /// to an ancestor chain. This never fails; unknown-parent headers are
    /// parked, not rejected.
    pub fn add(&mut self, header: BlockHeader) -> u128 {
        if let Some(existing) = self.entries.get(&header.hash) {
            return existing.cumulative_total_difficulty;
        }

        let parent = self.entries.get(&header.parent_hash);
        let (cumulative, linked) = match parent {
            Some(parent) if parent.linked => {
                (parent.cumulative_total_difficulty.saturating_add(header.difficulty), true)
            }
            _ => (header.difficulty, false),
        };

        let hash = header.hash;
        let number = header.number;
        let parent_hash = header.parent_hash;
        self.entries.insert(hash, Entry { header, cumulative_total_difficulty: cumulative, linked });

        if linked {
            self.consider_best(hash, cumulative, number);
            self.relink_children(hash);
        } else {
            self.parked_children.entry(parent_hash).or_default().push(hash);
        }

        cumulative
    }

    /// Promotes every header parked on `parent_hash` now that it has
    /// linked, recursively promoting their own parked children in turn.
    fn relink_children(&mut self, parent_hash: BlockHash) {
        let Some(children) = self.parked_children.remove(&parent_hash) else { return };

        for child_hash in children {
            let (cumulative, number) = {
                let parent = &self.entries[&parent_hash];
                let parent_cumulative = parent.cumulative_total_difficulty;
                let child = self.entries.get_mut(&child_hash).expect("parked child must be stored");
                child.cumulative_total_difficulty = parent_cumulative.saturating_add(child.header.difficulty);
                child.linked = true;
                (child.cumulative_total_difficulty, child.header.number)
            };

            self.consider_best(child_hash, cumulative, number);
            self.relink_children(child_hash);
        }
    }

    /// Updates the best pointer if `candidate` beats the current best under
    /// the tie-break rule: highest cumulative total difficulty, then lower
    /// number (shorter chain), then lexicographically smaller hash.
    fn consider_best(&mut self, candidate: BlockHash, cumulative: u128, number: u64) {
        let replace = match self.best {
            None => true,
            Some(best_hash) => {
                let best = &self.entries[&best_hash];
                match cumulative.cmp(&best.cumulative_total_difficulty) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Less => false,
                    std::cmp::Ordering::Equal => match number.cmp(&best.header.number) {
                        std::cmp::Ordering::Less => true,
                        std::cmp::Ordering::Greater => false,
                        std::cmp::Ordering::Equal => candidate < best_hash,
                    },
                }
            }
        };

        if replace {
            self.best = Some(candidate);
        }
    }

    /// The current best head: its header and cumulative total difficulty.
    ///
    /// # Panics
    ///
    /// Panics if called before [`reset_head`](Self::reset_head) has ever
    /// been called.
    pub fn head(&self) -> (BlockHeader, u128) {
        let hash = self.best.expect("fork choice view used before reset_head");
        let entry = &self.entries[&hash];
        (entry.header.clone(), entry.cumulative_total_difficulty)
    }

    /// Height of the current best head.
    pub fn head_height(&self) -> u64 {
        self.head().0.number
    }

    /// Hash of the current best head.
    pub fn head_hash(&self) -> BlockHash {
        self.head().0.hash
    }

    /// Drops every stored entry whose number is strictly below `below`.
    /// Safe to call any time the engine has confirmed a new canonical head;
    /// entries needed to re-derive the current best are never pruned by
    /// callers that keep `below` at least `window` behind the confirmed
    /// head.
    pub fn prune(&mut self, below: u64) {
        self.entries.retain(|_, entry| entry.header.number >= below);
        self.parked_children.retain(|parent_hash, children| {
            children.retain(|c| self.entries.contains_key(c));
            self.entries.contains_key(parent_hash) && !children.is_empty()
        });
    }

    /// Number of headers currently tracked by the view.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the view holds no headers at all (not even an anchor).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BlockId;

    fn header(number: u64, hash: u8, parent_hash: u8, difficulty: u128) -> BlockHeader {
        BlockHeader {
            parent_hash: BlockHash::with_last_byte(parent_hash),
            number,
            hash: BlockHash::with_last_byte(hash),
            difficulty,
            extra: Vec::new(),
        }
    }

    #[test]
    fn reset_head_then_add_same_header_leaves_head_unchanged() {
        let mut view = ForkChoiceView::new();
        let head = ChainHead::new(BlockId::new(100, BlockHash::with_last_byte(0xA)), 1_000);
        view.reset_head(head);

        let (head_header, td) = view.head();
        assert_eq!(head_header.hash, head.hash());
        assert_eq!(td, head.total_difficulty);
        assert_eq!(view.head_height(), 100);
    }

    #[test]
    fn linked_header_with_higher_difficulty_becomes_best() {
        let mut view = ForkChoiceView::new();
        view.reset_head(ChainHead::new(BlockId::new(100, BlockHash::with_last_byte(0xA)), 1_000));

        let td = view.add(header(101, 0xB, 0xA, 50));
        assert_eq!(td, 1_050);
        assert_eq!(view.head_hash(), BlockHash::with_last_byte(0xB));
        assert_eq!(view.head_height(), 101);
    }

    #[test]
    fn tie_break_prefers_shorter_chain_then_smaller_hash() {
        let mut view = ForkChoiceView::new();
        view.reset_head(ChainHead::new(BlockId::new(0, BlockHash::with_last_byte(0x0)), 0));

        // Two branches reaching equal cumulative difficulty: one in a
        // single hop, one in two hops. The shorter one must win.
        view.add(header(1, 0x2, 0x0, 100));
        view.add(header(1, 0x1, 0x0, 50));
        view.add(header(2, 0x3, 0x1, 50));

        assert_eq!(view.head_height(), 1);
        assert_eq!(view.head_hash(), BlockHash::with_last_byte(0x2));
    }

    #[test]
    fn unknown_parent_is_parked_and_does_not_move_best() {
        let mut view = ForkChoiceView::new();
        view.reset_head(ChainHead::new(BlockId::new(100, BlockHash::with_last_byte(0xA)), 1_000));

        // Parent 0xFF was never seen.
        view.add(header(102, 0xC, 0xFF, 10_000));

        assert_eq!(view.head_height(), 100);
        assert_eq!(view.head_hash(), BlockHash::with_last_byte(0xA));
    }

    #[test]
    fn parked_header_links_once_its_parent_arrives() {
        let mut view = ForkChoiceView::new();
        view.reset_head(ChainHead::new(BlockId::new(100, BlockHash::with_last_byte(0xA)), 1_000));

        view.add(header(102, 0xC, 0xB, 10));
        assert_eq!(view.head_height(), 100);

        view.add(header(101, 0xB, 0xA, 5));
        assert_eq!(view.head_height(), 102);
        assert_eq!(view.head_hash(), BlockHash::with_last_byte(0xC));
    }

    #[test]
    fn prune_drops_entries_below_the_window() {
        let mut view = ForkChoiceView::new();
        view.reset_head(ChainHead::new(BlockId::new(100, BlockHash::with_last_byte(0xA)), 1_000));
        view.add(header(101, 0xB, 0xA, 5));

        assert_eq!(view.len(), 2);
        view.prune(101);
        assert_eq!(view.len(), 1);
    }
}
