#[cfg(feature = "profiling")]
use culprit_search::{
    CancellationToken, CulpritSearch, IdentityRenderer, LoggingMonitor, OracleResult, Result,
    SearchConfig,
};
#[cfg(feature = "profiling")]
use std::{fs::File, time::Instant};
#[cfg(feature = "profiling")]
use tracing_subscriber::{self, prelude::*, EnvFilter};

/// Pretends two of the items conflict, so omitting either one makes the failure go away.
#[cfg(feature = "profiling")]
fn conflict_oracle(kept: &Vec<u32>) -> Result<OracleResult> {
    let conflict = kept.contains(&3) && kept.contains(&11);
    Ok(OracleResult {
        success: !conflict,
        diagnostics: conflict.then(|| "items 3 and 11 conflict".to_string()),
    })
}

#[cfg(feature = "profiling")]
#[tracing::instrument]
fn profile_search(items: u32, max_attempts: u64) -> Result<()> {
    let config = SearchConfig::default().with_max_attempts(max_attempts);
    let mut search = CulpritSearch::with_config(
        (0..items).collect(),
        IdentityRenderer,
        conflict_oracle,
        LoggingMonitor,
        config,
    )?;
    let summary = search.run(&CancellationToken::new());
    tracing::info!(
        attempts = summary.attempts,
        culprits = summary.culprits.len(),
        "search finished"
    );
    println!("{}", summary.to_json()?);
    Ok(())
}

#[cfg(feature = "profiling")]
fn main() -> Result<()> {
    // Set up tracing subscriber to write to a file
    let file = File::create("trace.json")?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking),
        )
        .init();

    println!("Profiling culprit search over 24 items...");
    let start = Instant::now();
    profile_search(24, 5_000)?;
    println!("Search complete in: {:?}", start.elapsed());
    Ok(())
}

#[cfg(not(feature = "profiling"))]
fn main() {
    println!("profile_search binary requires --features profiling");
}
