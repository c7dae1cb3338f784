use culprit_search::prelude::*;
use std::time::Duration;

#[test]
fn test_worker_forwards_events_over_channel() {
    let (monitor, events) = ChannelMonitor::unbounded();
    let search = CulpritSearch::new(
        vec!["alpha", "beta", "gamma"],
        IdentityRenderer,
        |kept: &Vec<&str>| -> Result<OracleResult> {
            Ok(OracleResult {
                success: !kept.contains(&"beta"),
                diagnostics: None,
            })
        },
        monitor,
    )
    .unwrap();

    let handle = spawn_search(search, CancellationToken::new()).unwrap();
    let summary = handle.join().unwrap();
    assert!(summary.exhausted);
    assert_eq!(summary.attempts, 7);
    assert_eq!(summary.smallest_culprit(), Some(&["beta"][..]));

    let received: Vec<MonitorEvent<&str>> = events.try_iter().collect();
    let attempts = received
        .iter()
        .filter(|event| matches!(event, MonitorEvent::Attempt { .. }))
        .count();
    assert_eq!(attempts, 7);
    assert!(matches!(received.last(), Some(MonitorEvent::Status(_))));
}

#[test]
fn test_worker_waits_for_continue_and_can_be_cancelled() {
    let (monitor, events) = ChannelMonitor::unbounded();
    let config = SearchConfig::default().with_auto_continue(false);
    let search = CulpritSearch::with_config(
        (0..10u32).collect(),
        IdentityRenderer,
        |_: &Vec<u32>| -> Result<OracleResult> { Ok(OracleResult::failure()) },
        monitor,
        config,
    )
    .unwrap();

    let handle = spawn_search(search, CancellationToken::new()).unwrap();

    let mut completed = 0;
    while completed < 3 {
        match events.recv_timeout(Duration::from_secs(5)).unwrap() {
            MonitorEvent::Completed { next, .. } => {
                completed += 1;
                if completed < 3 {
                    next.request_next();
                }
            }
            _ => {}
        }
    }

    handle.cancel();
    let summary = handle.join().unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.attempts, 3);
}
