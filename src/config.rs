//! Search configuration

use crate::error::{Result, SearchError};
use crate::oracle::Verdict;
use serde::{Deserialize, Serialize};

/// Largest capacity for which exact de-duplication can be tracked in a `u64` encoding.
pub const MAX_DEDUP_LIMIT_BITS: usize = 64;

/// Tunables for a single culprit search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Exact seen-set de-duplication is enabled when the item count is at most this
    pub dedup_limit_bits: usize,
    /// Stop `run` after this many attempts
    pub max_attempts: Option<u64>,
    /// When false, `run` waits for the monitor to request the next step
    pub auto_continue: bool,
    /// Oracle verdict that marks an omitted set as a culprit
    pub culprit_verdict: Verdict,
    /// Candidates evaluated together by `run_batch`
    pub batch_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            dedup_limit_bits: 32,
            max_attempts: None,
            auto_continue: true,
            culprit_verdict: Verdict::Success,
            batch_size: 4,
        }
    }
}

impl SearchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dedup_limit_bits > MAX_DEDUP_LIMIT_BITS {
            return Err(SearchError::Config(format!(
                "dedup_limit_bits {} exceeds {MAX_DEDUP_LIMIT_BITS}",
                self.dedup_limit_bits
            )));
        }
        if self.batch_size == 0 {
            return Err(SearchError::Config("batch_size must be at least 1".into()));
        }
        Ok(())
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_auto_continue(mut self, auto_continue: bool) -> Self {
        self.auto_continue = auto_continue;
        self
    }

    pub fn with_culprit_verdict(mut self, verdict: Verdict) -> Self {
        self.culprit_verdict = verdict;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_dedup_limit_bits(mut self, bits: usize) -> Self {
        self.dedup_limit_bits = bits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.dedup_limit_bits, 32);
        assert!(config.auto_continue);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "max_attempts": 10, "culprit_verdict": "Failure" }"#;
        let config = SearchConfig::from_json(json).unwrap();
        assert_eq!(config.max_attempts, Some(10));
        assert_eq!(config.culprit_verdict, Verdict::Failure);
        assert_eq!(config.batch_size, 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            SearchConfig::from_json(r#"{ "dedup_limit_bits": 65 }"#),
            Err(SearchError::Config(_))
        ));
        assert!(matches!(
            SearchConfig::from_json(r#"{ "batch_size": 0 }"#),
            Err(SearchError::Config(_))
        ));
        assert!(matches!(
            SearchConfig::from_json("not json"),
            Err(SearchError::Serialization(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = SearchConfig::default()
            .with_max_attempts(7)
            .with_batch_size(2);
        let parsed = SearchConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
