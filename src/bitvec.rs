//! Fixed-capacity bit vector backed by a Vec<u64>.
//! Bits at or beyond `capacity` in the last word are masked off: they are never set,
//! never reported, and never chosen as a move or rotate target.

use std::fmt;

const WORD_BITS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackedBitVector {
    words: Vec<u64>,
    capacity: usize,
    end_mask: u64,
}

impl PackedBitVector {
    /// Create a vector of `capacity_bits` positions with only bit 0 set.
    ///
    /// # Panics
    ///
    /// Panics if `capacity_bits` is zero.
    pub fn new(capacity_bits: usize) -> Self {
        let mut bits = Self::empty(capacity_bits);
        bits.set(0);
        bits
    }

    /// Create a vector of `capacity_bits` positions with every bit clear.
    ///
    /// # Panics
    ///
    /// Panics if `capacity_bits` is zero.
    pub fn empty(capacity_bits: usize) -> Self {
        assert!(
            capacity_bits > 0,
            "PackedBitVector capacity must be non-zero"
        );
        let tail = capacity_bits % WORD_BITS;
        let end_mask = if tail == 0 {
            u64::MAX
        } else {
            (1u64 << tail) - 1
        };
        Self {
            words: vec![0; capacity_bits.div_ceil(WORD_BITS)],
            capacity: capacity_bits,
            end_mask,
        }
    }

    /// Number of addressable positions.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Backing words, lowest positions first.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    fn locate(&self, index: usize) -> (usize, u64) {
        assert!(
            index < self.capacity,
            "bit index {index} out of range for capacity {}",
            self.capacity
        );
        (index / WORD_BITS, 1u64 << (index % WORD_BITS))
    }

    /// Mask of the usable bits in word `word_idx`.
    #[inline]
    fn usable(&self, word_idx: usize) -> u64 {
        if word_idx + 1 == self.words.len() {
            self.end_mask
        } else {
            u64::MAX
        }
    }

    /// Check if the bit at `index` is set. Positions past the capacity read as unset.
    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        if index >= self.capacity {
            return false;
        }
        let (word_idx, mask) = self.locate(index);
        self.words[word_idx] & mask != 0
    }

    /// Set the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    #[inline]
    pub fn set(&mut self, index: usize) {
        let (word_idx, mask) = self.locate(index);
        self.words[word_idx] |= mask;
    }

    /// Clear the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        let (word_idx, mask) = self.locate(index);
        self.words[word_idx] &= !mask;
    }

    pub fn clear_all(&mut self) {
        self.words.iter_mut().for_each(|word| *word = 0);
    }

    /// Number of set bits.
    pub fn cardinality(&self) -> usize {
        self.words
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// True when every addressable position is set.
    pub fn is_saturated(&self) -> bool {
        self.cardinality() == self.capacity
    }

    pub fn first_set_at_or_after(&self, from: usize) -> Option<usize> {
        self.scan_forward(from, false)
    }

    pub fn first_unset_at_or_after(&self, from: usize) -> Option<usize> {
        self.scan_forward(from, true)
    }

    /// `from` values past the capacity are clamped to the last position.
    pub fn last_set_at_or_before(&self, from: usize) -> Option<usize> {
        self.scan_backward(from, false)
    }

    /// `from` values past the capacity are clamped to the last position.
    pub fn last_unset_at_or_before(&self, from: usize) -> Option<usize> {
        self.scan_backward(from, true)
    }

    #[inline]
    fn view(&self, word_idx: usize, unset: bool) -> u64 {
        let word = self.words[word_idx];
        let word = if unset { !word } else { word };
        word & self.usable(word_idx)
    }

    fn scan_forward(&self, from: usize, unset: bool) -> Option<usize> {
        if from >= self.capacity {
            return None;
        }
        let mut word_idx = from / WORD_BITS;
        let mut word = self.view(word_idx, unset) & (u64::MAX << (from % WORD_BITS));
        loop {
            if word != 0 {
                return Some(word_idx * WORD_BITS + word.trailing_zeros() as usize);
            }
            word_idx += 1;
            if word_idx >= self.words.len() {
                return None;
            }
            word = self.view(word_idx, unset);
        }
    }

    fn scan_backward(&self, from: usize, unset: bool) -> Option<usize> {
        let from = from.min(self.capacity - 1);
        let mut word_idx = from / WORD_BITS;
        let mut word =
            self.view(word_idx, unset) & (u64::MAX >> (WORD_BITS - 1 - from % WORD_BITS));
        loop {
            if word != 0 {
                return Some(word_idx * WORD_BITS + WORD_BITS - 1 - word.leading_zeros() as usize);
            }
            if word_idx == 0 {
                return None;
            }
            word_idx -= 1;
            word = self.view(word_idx, unset);
        }
    }

    /// Relocate the first set bit at or after `from` to the first unset bit above it.
    ///
    /// Returns the new position, or `None` (vector untouched) when there is no set bit at
    /// or after `from` or no unset bit above it.
    pub fn move_bit_left(&mut self, from: usize) -> Option<usize> {
        let source = self.first_set_at_or_after(from)?;
        let target = self.first_unset_at_or_after(source + 1)?;
        self.clear(source);
        self.set(target);
        Some(target)
    }

    /// Relocate the last set bit at or before `from` to the last unset bit below it.
    ///
    /// Returns the new position, or `None` (vector untouched) when no such move exists.
    pub fn move_bit_right(&mut self, from: usize) -> Option<usize> {
        let source = self.last_set_at_or_before(from)?;
        let target = source
            .checked_sub(1)
            .and_then(|below| self.last_unset_at_or_before(below))?;
        self.clear(source);
        self.set(target);
        Some(target)
    }

    /// Like [`move_bit_left`](Self::move_bit_left), but wraps around to the lowest unset
    /// position when nothing above is free. Only fails when there is no set bit at or after
    /// `from`.
    pub fn rotate_bit_left(&mut self, from: usize) -> Option<usize> {
        let source = self.first_set_at_or_after(from)?;
        self.clear(source);
        // source itself is unset now, so the wrapped scan always lands somewhere
        let target = self
            .first_unset_at_or_after(source + 1)
            .or_else(|| self.first_unset_at_or_after(0))
            .unwrap_or(source);
        self.set(target);
        Some(target)
    }

    /// Mirror of [`rotate_bit_left`](Self::rotate_bit_left): scans downward and wraps to the
    /// highest unset position.
    pub fn rotate_bit_right(&mut self, from: usize) -> Option<usize> {
        let source = self.last_set_at_or_before(from)?;
        self.clear(source);
        let target = source
            .checked_sub(1)
            .and_then(|below| self.last_unset_at_or_before(below))
            .or_else(|| self.last_unset_at_or_before(self.capacity - 1))
            .unwrap_or(source);
        self.set(target);
        Some(target)
    }

    /// Integer encoding of the pattern (bit `i` of the result is position `i`).
    /// Only available when the whole pattern fits in one word.
    pub fn to_bits_u64(&self) -> Option<u64> {
        (self.capacity <= WORD_BITS).then(|| self.words[0])
    }

    /// Iterator over the positions of set bits, ascending.
    pub fn ones(&self) -> Ones<'_> {
        Ones {
            bits: self,
            word_idx: 0,
            current_word: self.words[0],
        }
    }
}

impl fmt::Display for PackedBitVector {
    /// Renders position 0 first, e.g. `1010` for bits {0, 2} of a 4-bit vector.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.capacity {
            f.write_str(if self.is_set(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

pub struct Ones<'a> {
    bits: &'a PackedBitVector,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let trailing = self.current_word.trailing_zeros();
                self.current_word &= self.current_word - 1;
                return Some(self.word_idx * WORD_BITS + trailing as usize);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bits.words.len() {
                return None;
            }
            self.current_word = self.bits.words[self.word_idx];
        }
    }
}
