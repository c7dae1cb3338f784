// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Subset enumeration over an ordered item list.
//!
//! Bit `i` of the pattern stands for item `i`. A set bit means the item is omitted from the
//! candidate, a clear bit means it is kept. The enumerator skips the empty pattern, an exact
//! repeat of the pattern it returned last, and (for small item counts only) any pattern it
//! has returned before.
//!
//! Above the de-duplication limit no seen-set is kept, so repeats are filtered only when
//! they are back to back.

use crate::bitvec::PackedBitVector;
use crate::cursor::{Advance, CursorChain};
use crate::error::{Result, SearchError};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Default item count up to which every produced pattern is remembered.
pub const DEFAULT_DEDUP_LIMIT_BITS: usize = 32;

/// `2^capacity_bits`, saturating at `u128::MAX`.
pub fn theoretical_max_attempts(capacity_bits: usize) -> u128 {
    if capacity_bits >= 128 {
        u128::MAX
    } else {
        1u128 << capacity_bits
    }
}

/// One candidate: which items stay and which are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<T> {
    pub kept: Vec<T>,
    pub omitted: Vec<T>,
    /// Positions of the omitted items in the input item list
    pub positions: Vec<usize>,
}

/// Counters for patterns produced and filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumeratorStats {
    pub produced: u64,
    pub skipped_empty: u64,
    pub skipped_repeat: u64,
    pub skipped_seen: u64,
}

pub struct SubsetEnumerator<T> {
    items: Vec<T>,
    bits: PackedBitVector,
    chain: CursorChain,
    previous: Option<PackedBitVector>,
    seen: Option<AHashSet<u64>>,
    stats: EnumeratorStats,
}

impl<T: Clone> SubsetEnumerator<T> {
    pub fn new(items: Vec<T>) -> Result<Self> {
        Self::with_dedup_limit(items, DEFAULT_DEDUP_LIMIT_BITS)
    }

    /// Build an enumerator that remembers every produced pattern when
    /// `items.len() <= dedup_limit_bits` (clamped to 64).
    pub fn with_dedup_limit(items: Vec<T>, dedup_limit_bits: usize) -> Result<Self> {
        if items.is_empty() {
            return Err(SearchError::EmptyItemSource);
        }
        let mut bits = PackedBitVector::new(items.len());
        let chain = CursorChain::new(&mut bits);
        let seen = (items.len() <= dedup_limit_bits.min(64)).then(AHashSet::default);

        Ok(Self {
            items,
            bits,
            chain,
            previous: None,
            seen,
            stats: EnumeratorStats::default(),
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn capacity(&self) -> usize {
        self.bits.capacity()
    }

    pub fn max_attempts(&self) -> u128 {
        theoretical_max_attempts(self.capacity())
    }

    pub fn stats(&self) -> EnumeratorStats {
        self.stats
    }

    pub fn dedup_enabled(&self) -> bool {
        self.seen.is_some()
    }

    /// Current pattern (set bits are omitted items).
    pub fn bits(&self) -> &PackedBitVector {
        &self.bits
    }

    pub fn chain(&self) -> &CursorChain {
        &self.chain
    }

    pub fn is_exhausted(&self) -> bool {
        self.chain.is_exhausted()
    }

    fn advance_pattern(&mut self) -> bool {
        loop {
            let Some(advance) = self.chain.advance(&mut self.bits) else {
                return false;
            };

            if self.bits.is_empty() {
                self.stats.skipped_empty += 1;
                continue;
            }
            if self.previous.as_ref() == Some(&self.bits) {
                self.stats.skipped_repeat += 1;
                continue;
            }
            if let (Some(seen), Some(code)) = (self.seen.as_mut(), self.bits.to_bits_u64()) {
                if !seen.insert(code) {
                    self.stats.skipped_seen += 1;
                    continue;
                }
            }

            match self.previous.as_mut() {
                Some(previous) => previous.clone_from(&self.bits),
                None => self.previous = Some(self.bits.clone()),
            }
            self.stats.produced += 1;
            if let Advance::Grown { cardinality } = advance {
                tracing::info!(cardinality, "omitting {cardinality} items at a time");
            }
            tracing::trace!(pattern = %self.bits, "candidate pattern");
            return true;
        }
    }

    /// Split the items for the next pattern into the caller's buffers, reusing their
    /// allocations. Returns `false` once the enumeration is exhausted; the buffers are left
    /// untouched in that case.
    pub fn next_into(&mut self, kept: &mut Vec<T>, omitted: &mut Vec<T>) -> bool {
        if !self.advance_pattern() {
            return false;
        }
        kept.clear();
        omitted.clear();
        for (index, item) in self.items.iter().enumerate() {
            if self.bits.is_set(index) {
                omitted.push(item.clone());
            } else {
                kept.push(item.clone());
            }
        }
        true
    }

    /// Advance, hand `(kept, omitted)` to `observer`, and return the kept items.
    pub fn next_with<F>(&mut self, observer: F) -> Option<Vec<T>>
    where
        F: FnOnce(&[T], &[T]),
    {
        let mut kept = Vec::with_capacity(self.items.len());
        let mut omitted = Vec::new();
        if !self.next_into(&mut kept, &mut omitted) {
            return None;
        }
        observer(&kept, &omitted);
        Some(kept)
    }
}

impl<T: Clone> Iterator for SubsetEnumerator<T> {
    type Item = Candidate<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut kept = Vec::with_capacity(self.items.len());
        let mut omitted = Vec::new();
        if !self.next_into(&mut kept, &mut omitted) {
            return None;
        }
        Some(Candidate {
            kept,
            omitted,
            positions: self.bits.ones().collect(),
        })
    }
}
