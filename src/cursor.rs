//! Cursor chain
//!
//! A chain of cursors, each owning exactly one set bit of a [`PackedBitVector`]. The chain
//! walks through candidate bit patterns one generation at a time: with `k` cursors it
//! visits every way of placing `k` bits, then spawns cursor `k + 1` and starts over from
//! the lowest positions. Cursors are stored in an index-addressed stack; the parent of
//! cursor `i` is `i - 1` and its child is `i + 1`.

use crate::bitvec::PackedBitVector;
use smallvec::SmallVec;

/// A single tracked bit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Bit this cursor currently holds
    pub position: usize,
    /// Bit this cursor was seated on after its most recent reset
    pub initial_position: usize,
}

impl Cursor {
    fn seated(position: usize) -> Self {
        Self {
            position,
            initial_position: position,
        }
    }
}

/// What a call to [`CursorChain::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// First call: the freshly constructed root state is the candidate
    Initial,
    /// `cursor` moved to `position`; its descendants were re-seated behind it
    Moved { cursor: usize, position: usize },
    /// A new cursor was spawned and the chain now holds `cardinality` cursors
    Grown { cardinality: usize },
}

pub struct CursorChain {
    cursors: SmallVec<[Cursor; 8]>,
    started: bool,
    exhausted: bool,
}

impl CursorChain {
    /// Reset `bits` to the single root bit and build the chain over it.
    pub fn new(bits: &mut PackedBitVector) -> Self {
        bits.clear_all();
        bits.set(0);
        let mut cursors = SmallVec::new();
        cursors.push(Cursor::seated(0));
        Self {
            cursors,
            started: false,
            exhausted: false,
        }
    }

    /// Number of live cursors (equals the number of set bits).
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// The chain always holds at least the root.
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.cursors.iter().map(|cursor| cursor.position)
    }

    /// The most recently spawned cursor.
    pub fn active(&self) -> &Cursor {
        &self.cursors[self.cursors.len() - 1]
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        idx.checked_sub(1)
    }

    pub fn child(&self, idx: usize) -> Option<usize> {
        (idx + 1 < self.cursors.len()).then_some(idx + 1)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// A position is owned, from the point of view of cursor `idx`, when one of its
    /// ancestors sits on it or was seated on it. Descendants never own anything for
    /// `idx`: they are lifted and re-seated whenever `idx` moves.
    ///
    /// Positions increase strictly along the chain, so every owned position lies below
    /// `idx` and the upward scans in [`advance`](Self::advance) never actually hit one.
    pub fn is_owned(&self, position: usize, idx: usize) -> bool {
        self.cursors[..idx.min(self.cursors.len())]
            .iter()
            .any(|cursor| cursor.position == position || cursor.initial_position == position)
    }

    /// True when the live cursors and the set bits of `bits` describe the same set.
    pub fn is_consistent_with(&self, bits: &PackedBitVector) -> bool {
        let mut positions: SmallVec<[usize; 8]> = self.positions().collect();
        positions.sort_unstable();
        let distinct = positions.windows(2).all(|pair| pair[0] != pair[1]);
        distinct && bits.ones().eq(positions.iter().copied())
    }

    /// Move to the next pattern. Returns `None` once every generation up to a saturated
    /// vector has been walked; further calls keep returning `None`.
    pub fn advance(&mut self, bits: &mut PackedBitVector) -> Option<Advance> {
        if !self.started {
            self.started = true;
            return Some(Advance::Initial);
        }
        if self.exhausted {
            return None;
        }

        if let Some(cursor) = self.eligible(bits) {
            let position = self.step(bits, cursor);
            return Some(Advance::Moved { cursor, position });
        }

        let grown = self.grow(bits);
        if grown.is_none() {
            self.exhausted = true;
        }
        grown
    }

    /// Deepest cursor with an unowned free slot above it.
    fn eligible(&self, bits: &PackedBitVector) -> Option<usize> {
        (0..self.cursors.len()).rev().find(|&idx| {
            let above = self.cursors[idx].position + 1;
            self.first_free_from(bits, above, idx).is_some()
        })
    }

    fn first_free_from(
        &self,
        bits: &PackedBitVector,
        mut from: usize,
        idx: usize,
    ) -> Option<usize> {
        while let Some(candidate) = bits.first_unset_at_or_after(from) {
            if !self.is_owned(candidate, idx) {
                return Some(candidate);
            }
            from = candidate + 1;
        }
        None
    }

    fn step(&mut self, bits: &mut PackedBitVector, idx: usize) -> usize {
        for cursor in &self.cursors[idx + 1..] {
            bits.clear(cursor.position);
        }

        let mut position = self.cursors[idx].position;
        while let Some(next) = bits.move_bit_left(position) {
            position = next;
            if !self.is_owned(position, idx) {
                break;
            }
        }
        self.cursors[idx].position = position;
        self.reseat_descendants(bits, idx);
        position
    }

    /// Seat every descendant of `idx` on the first free bit after its parent.
    /// Descendant bits must already be clear.
    fn reseat_descendants(&mut self, bits: &mut PackedBitVector, idx: usize) {
        for child in idx + 1..self.cursors.len() {
            let anchor = self.cursors[child - 1].position + 1;
            let seat = bits.first_unset_at_or_after(anchor).unwrap_or(anchor);
            bits.set(seat);
            self.cursors[child] = Cursor::seated(seat);
        }
    }

    fn grow(&mut self, bits: &mut PackedBitVector) -> Option<Advance> {
        if self.cursors.len() >= bits.capacity() {
            return None;
        }

        // Every cursor is packed against the top, so the root wraps back to the start.
        let start = bits.rotate_bit_left(self.cursors[0].position)?;
        self.cursors[0].position = start;
        for cursor in &self.cursors[1..] {
            bits.clear(cursor.position);
        }
        self.reseat_descendants(bits, 0);

        let spawned = self.cursors.len();
        let origin = self.cursors[0].initial_position;
        let seat = self
            .first_free_from(bits, origin, spawned)
            .or_else(|| self.first_free_from(bits, 0, spawned))?;
        bits.set(seat);
        self.cursors.push(Cursor::seated(seat));

        tracing::debug!(cardinality = self.cursors.len(), "cursor chain grew");
        Some(Advance::Grown {
            cardinality: self.cursors.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(capacity: usize) -> Vec<Vec<usize>> {
        let mut bits = PackedBitVector::new(capacity);
        let mut chain = CursorChain::new(&mut bits);
        let mut patterns = Vec::new();
        while chain.advance(&mut bits).is_some() {
            assert!(chain.is_consistent_with(&bits));
            patterns.push(bits.ones().collect());
        }
        patterns
    }

    #[test]
    fn test_single_bit_chain() {
        assert_eq!(walk(1), vec![vec![0]]);
    }

    #[test]
    fn test_four_bit_order() {
        let expected: Vec<Vec<usize>> = vec![
            vec![0],
            vec![1],
            vec![2],
            vec![3],
            vec![0, 1],
            vec![0, 2],
            vec![0, 3],
            vec![1, 2],
            vec![1, 3],
            vec![2, 3],
            vec![0, 1, 2],
            vec![0, 1, 3],
            vec![0, 2, 3],
            vec![1, 2, 3],
            vec![0, 1, 2, 3],
        ];
        assert_eq!(walk(4), expected);
    }

    #[test]
    fn test_advance_reports_growth() {
        let mut bits = PackedBitVector::new(2);
        let mut chain = CursorChain::new(&mut bits);
        assert_eq!(chain.advance(&mut bits), Some(Advance::Initial));
        assert_eq!(
            chain.advance(&mut bits),
            Some(Advance::Moved {
                cursor: 0,
                position: 1
            })
        );
        assert_eq!(
            chain.advance(&mut bits),
            Some(Advance::Grown { cardinality: 2 })
        );
        assert_eq!(chain.advance(&mut bits), None);
        assert!(chain.is_exhausted());
        assert_eq!(chain.advance(&mut bits), None);
        assert!(bits.is_saturated());
    }

    #[test]
    fn test_parent_child_links() {
        let mut bits = PackedBitVector::new(3);
        let mut chain = CursorChain::new(&mut bits);
        while chain.len() < 2 {
            chain.advance(&mut bits);
        }
        assert_eq!(chain.parent(0), None);
        assert_eq!(chain.parent(1), Some(0));
        assert_eq!(chain.child(0), Some(1));
        assert_eq!(chain.child(1), None);
        assert_eq!(chain.active().position, 1);
        assert!(chain.is_owned(0, 1));
        assert!(!chain.is_owned(2, 1));
    }

    #[test]
    fn test_every_pattern_visited_once() {
        let patterns = walk(8);
        assert_eq!(patterns.len(), (1 << 8) - 1);
        let distinct: std::collections::HashSet<_> = patterns.iter().collect();
        assert_eq!(distinct.len(), patterns.len());
    }
}
