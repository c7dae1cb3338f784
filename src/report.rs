//! Search summary and JSON export

use crate::enumerator::EnumeratorStats;
use crate::error::Result;
use crate::oracle::{Outcome, Verdict};
use serde::{Deserialize, Serialize};

/// Running tally of a culprit search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSummary<T> {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub oracle_errors: u64,
    /// Every candidate the enumerator can produce has been tried
    pub exhausted: bool,
    pub cancelled: bool,
    /// Stopped at the configured attempt cap
    pub limit_reached: bool,
    /// Omitted sets whose verdict matched the configured culprit verdict, in discovery order
    pub culprits: Vec<Vec<T>>,
    pub enumerator: EnumeratorStats,
}

impl<T> Default for SearchSummary<T> {
    fn default() -> Self {
        Self {
            attempts: 0,
            successes: 0,
            failures: 0,
            oracle_errors: 0,
            exhausted: false,
            cancelled: false,
            limit_reached: false,
            culprits: Vec::new(),
            enumerator: EnumeratorStats::default(),
        }
    }
}

impl<T> SearchSummary<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one judged attempt; keep `omitted` if it is a culprit.
    pub fn record(&mut self, omitted: &[T], outcome: &Outcome, culprit_verdict: Verdict)
    where
        T: Clone,
    {
        match outcome {
            Outcome::Success(_) => self.successes += 1,
            Outcome::Failure(_) => self.failures += 1,
            Outcome::OracleError(_) => self.oracle_errors += 1,
        }
        if outcome.verdict() == Some(culprit_verdict) {
            self.culprits.push(omitted.to_vec());
        }
    }

    /// True once the search cannot make further progress without outside help.
    pub fn is_finished(&self) -> bool {
        self.exhausted || self.cancelled || self.limit_reached
    }

    /// Culprit with the fewest omitted items; the earliest one wins ties.
    pub fn smallest_culprit(&self) -> Option<&[T]> {
        self.culprits
            .iter()
            .min_by_key(|culprit| culprit.len())
            .map(Vec::as_slice)
    }

    pub fn to_json(&self) -> Result<String>
    where
        T: Serialize,
    {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
