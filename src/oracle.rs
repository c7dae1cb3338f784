//! Renderer and oracle collaborators.
//!
//! The search never looks inside items or artifacts. A [`Renderer`] turns the kept items
//! of a candidate into an artifact, and an [`Oracle`] judges that artifact. Both take
//! `&self` so a single oracle can serve a parallel batch; oracles that need mutable state
//! keep it behind a lock.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

/// Verdict of a single oracle run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Success,
    Failure,
}

/// What the oracle reported for one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResult {
    pub success: bool,
    /// Opaque diagnostic payload (compiler output, exit status, ...)
    pub diagnostics: Option<String>,
}

impl OracleResult {
    pub fn success() -> Self {
        Self {
            success: true,
            diagnostics: None,
        }
    }

    pub fn failure() -> Self {
        Self {
            success: false,
            diagnostics: None,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Into<String>) -> Self {
        self.diagnostics = Some(diagnostics.into());
        self
    }

    pub fn verdict(&self) -> Verdict {
        if self.success {
            Verdict::Success
        } else {
            Verdict::Failure
        }
    }
}

/// Classified result of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(OracleResult),
    Failure(OracleResult),
    /// Rendering or evaluation failed; the search carries on with the next candidate
    OracleError(SearchError),
}

impl Outcome {
    pub fn classify(result: Result<OracleResult>) -> Self {
        match result {
            Ok(result) if result.success => Outcome::Success(result),
            Ok(result) => Outcome::Failure(result),
            Err(err) => Outcome::OracleError(err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::OracleError(_))
    }

    /// Verdict of the oracle, if it produced one.
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            Outcome::Success(_) => Some(Verdict::Success),
            Outcome::Failure(_) => Some(Verdict::Failure),
            Outcome::OracleError(_) => None,
        }
    }

    pub fn oracle_result(&self) -> Option<&OracleResult> {
        match self {
            Outcome::Success(result) | Outcome::Failure(result) => Some(result),
            Outcome::OracleError(_) => None,
        }
    }
}

/// Builds the artifact handed to the oracle from the kept items
pub trait Renderer<T, A> {
    fn render(&self, kept: &[T]) -> Result<A>;
}

impl<T, A, F> Renderer<T, A> for F
where
    F: Fn(&[T]) -> Result<A>,
{
    fn render(&self, kept: &[T]) -> Result<A> {
        self(kept)
    }
}

/// Judges an artifact. May be slow, may fail, may panic.
pub trait Oracle<A> {
    fn evaluate(&self, artifact: &A) -> Result<OracleResult>;

    /// Get name for debugging
    fn name(&self) -> &str {
        "Oracle"
    }
}

impl<A, F> Oracle<A> for F
where
    F: Fn(&A) -> Result<OracleResult>,
{
    fn evaluate(&self, artifact: &A) -> Result<OracleResult> {
        self(artifact)
    }
}

/// Renderer that hands the kept items straight to the oracle
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityRenderer;

impl<T: Clone> Renderer<T, Vec<T>> for IdentityRenderer {
    fn render(&self, kept: &[T]) -> Result<Vec<T>> {
        Ok(kept.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_renderer_and_oracle() {
        let renderer = |kept: &[&str]| -> Result<String> { Ok(kept.join(" | ")) };
        let oracle = |artifact: &String| -> Result<OracleResult> {
            if artifact.contains("bad") {
                Ok(OracleResult::failure().with_diagnostics("bad rule kept"))
            } else {
                Ok(OracleResult::success())
            }
        };

        let artifact = renderer.render(&["a", "bad"]).unwrap();
        assert_eq!(artifact, "a | bad");
        let result = oracle.evaluate(&artifact).unwrap();
        assert_eq!(result.verdict(), Verdict::Failure);
        assert_eq!(result.diagnostics.as_deref(), Some("bad rule kept"));
    }

    #[test]
    fn test_oracle_error_passthrough() {
        let oracle = |_: &Vec<u8>| -> Result<OracleResult> {
            Err(SearchError::Oracle("no toolchain".into()))
        };
        let empty: Vec<u8> = Vec::new();
        assert!(matches!(oracle.evaluate(&empty), Err(SearchError::Oracle(_))));
        assert_eq!(Oracle::<Vec<u8>>::name(&oracle), "Oracle");
    }

    #[test]
    fn test_outcome_classification() {
        assert!(Outcome::classify(Ok(OracleResult::success())).is_success());
        assert_eq!(
            Outcome::classify(Ok(OracleResult::failure())).verdict(),
            Some(Verdict::Failure)
        );
        let errored = Outcome::classify(Err(SearchError::Oracle("boom".into())));
        assert!(errored.is_error());
        assert_eq!(errored.verdict(), None);
        assert!(errored.oracle_result().is_none());
    }

    #[test]
    fn test_identity_renderer() {
        let kept = IdentityRenderer.render(&[1, 2, 3]).unwrap();
        assert_eq!(kept, vec![1, 2, 3]);
    }
}
