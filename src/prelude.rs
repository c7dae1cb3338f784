//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use culprit_search::prelude::*;
//! ```

pub use crate::config::SearchConfig;
pub use crate::driver::{CancellationToken, CulpritSearch, Step};
pub use crate::enumerator::{Candidate, SubsetEnumerator};
pub use crate::error::{Result, SearchError};
pub use crate::monitor::{
    ChannelMonitor, ContinueHandle, LoggingMonitor, MonitorEvent, RecordingMonitor, SearchMonitor,
};
pub use crate::oracle::{IdentityRenderer, Oracle, OracleResult, Outcome, Renderer, Verdict};
pub use crate::report::SearchSummary;
pub use crate::worker::{spawn_search, SearchHandle};
