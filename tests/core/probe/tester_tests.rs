/*!
Tests for DistributionTester runs against scripted clients.

Cover paced distribution runs, fatal failures at the failing probe's index,
unpaced throughput timing and per-run record lifecycle.
*/

use crate::common::{
    backend, scripted_tester, test_options, ManualClock, ScriptedClient, Step, TEST_HEADER,
    TEST_URL,
};
use lbprobe::core::probe::{DistributionVerdict, ProbeError, ProbeObservation, RunDeadline};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test]
async fn test_paced_run_cycling_backends_passes() {
    let clock = ManualClock::new();
    let client = ScriptedClient::cycling(&["server-a", "server-b"], 10, 5).with_clock(&clock);
    let mut tester = scripted_tester(test_options(), client.clone(), clock);

    let report = tester
        .run_paced(10, &RunDeadline::unbounded())
        .await
        .unwrap();

    assert_eq!(report.requests, 10);
    assert_eq!(report.record.count("server-a"), 5);
    assert_eq!(report.record.count("server-b"), 5);
    assert_eq!(report.record.total(), 10);
    assert_eq!(
        report.verdict,
        DistributionVerdict::Met {
            distinct: 2,
            required: 2
        }
    );
    assert!(report.passed());
    assert_eq!(client.calls(), 10);
}

#[tokio::test]
async fn test_paced_run_single_backend_completes_but_fails() {
    let client = ScriptedClient::new((0..10).map(|_| backend("server-a", 5)));
    let mut tester = scripted_tester(test_options(), client.clone(), ManualClock::new());

    let report = tester
        .run_paced(10, &RunDeadline::unbounded())
        .await
        .unwrap();

    assert_eq!(report.record.count("server-a"), 10);
    assert_eq!(report.record.distinct(), 1);
    assert!(!report.passed());
    assert_eq!(
        report.verdict,
        DistributionVerdict::Unmet {
            distinct: 1,
            required: 2
        }
    );
    // the run is not aborted: every probe was issued
    assert_eq!(client.calls(), 10);
}

#[tokio::test]
async fn test_paced_run_missing_header_aborts_at_index() {
    let steps = vec![
        backend("server-a", 5),
        backend("server-b", 5),
        backend("server-a", 5),
        Step::NoHeader(Duration::from_millis(5)),
        backend("server-b", 5),
    ];
    let client = ScriptedClient::new(steps);
    let mut tester = scripted_tester(test_options(), client.clone(), ManualClock::new());

    let err = tester
        .run_paced(5, &RunDeadline::unbounded())
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::MissingIdentifier { index: 4 }));
    assert_eq!(err.to_string(), "Request 4: missing server identifier");
    assert_eq!(client.calls(), 4);
    assert_eq!(tester.record().total(), 3);
}

#[tokio::test]
async fn test_paced_run_transport_failure_aborts_immediately() {
    let steps = vec![
        backend("server-a", 5),
        Step::Fail("Request failed: connection refused".to_string()),
        backend("server-b", 5),
    ];
    let client = ScriptedClient::new(steps);
    let mut tester = scripted_tester(test_options(), client.clone(), ManualClock::new());

    let err = tester
        .run_paced(3, &RunDeadline::unbounded())
        .await
        .unwrap_err();

    match err {
        ProbeError::Transport { index, message } => {
            assert_eq!(index, 2);
            assert!(message.contains("connection refused"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_paced_run_sleeps_between_probes_only() {
    let clock = ManualClock::new();
    let client = ScriptedClient::cycling(&["server-a", "server-b"], 10, 7).with_clock(&clock);
    let mut tester = scripted_tester(test_options(), client, clock.clone());

    let report = tester
        .run_paced(10, &RunDeadline::unbounded())
        .await
        .unwrap();

    assert_eq!(clock.sleeps(), vec![Duration::from_millis(100); 9]);
    assert_eq!(
        report.elapsed,
        Duration::from_millis(10 * 7) + Duration::from_millis(9 * 100)
    );
}

#[tokio::test]
async fn test_paced_run_zero_interval_never_sleeps() {
    let clock = ManualClock::new();
    let mut options = test_options();
    options.request_interval = Duration::ZERO;
    let client = ScriptedClient::cycling(&["server-a", "server-b"], 4, 1).with_clock(&clock);
    let mut tester = scripted_tester(options, client, clock.clone());

    tester
        .run_paced(4, &RunDeadline::unbounded())
        .await
        .unwrap();

    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_unpaced_run_total_is_sum_of_latencies() {
    let clock = ManualClock::new();
    let steps: Vec<Step> = (0..20)
        .map(|i| backend(if i % 2 == 0 { "server-a" } else { "server-b" }, 5 + i as u64))
        .collect();
    let client = ScriptedClient::new(steps).with_clock(&clock);
    let mut tester = scripted_tester(test_options(), client, clock.clone());

    let report = tester
        .run_unpaced(20, &RunDeadline::unbounded())
        .await
        .unwrap();

    // 5ms + 6ms + ... + 24ms
    let expected_total = Duration::from_millis((5..25).sum::<u64>());
    assert_eq!(report.requests, 20);
    assert_eq!(report.total, expected_total);
    assert_eq!(report.latency_sum(), expected_total);
    assert_eq!(report.average, expected_total / 20);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_unpaced_run_tolerates_missing_header_by_default() {
    let steps = vec![
        backend("server-a", 5),
        Step::NoHeader(Duration::from_millis(5)),
        backend("server-b", 5),
    ];
    let client = ScriptedClient::new(steps);
    let mut tester = scripted_tester(test_options(), client, ManualClock::new());

    let report = tester
        .run_unpaced(3, &RunDeadline::unbounded())
        .await
        .unwrap();

    assert_eq!(report.requests, 3);
    assert_eq!(report.record.total(), 2);
    assert_eq!(report.observations[1].backend, None);
}

#[tokio::test]
async fn test_unpaced_run_can_require_identifier() {
    let mut options = test_options();
    options.throughput_requires_identifier = true;
    let steps = vec![backend("server-a", 5), Step::NoHeader(Duration::from_millis(5))];
    let mut tester = scripted_tester(options, ScriptedClient::new(steps), ManualClock::new());

    let err = tester
        .run_unpaced(2, &RunDeadline::unbounded())
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::MissingIdentifier { index: 2 }));
}

#[tokio::test]
async fn test_unpaced_run_optional_pacing() {
    let clock = ManualClock::new();
    let mut options = test_options();
    options.pace_throughput = true;
    let client = ScriptedClient::cycling(&["server-a"], 3, 10).with_clock(&clock);
    let mut tester = scripted_tester(options, client, clock.clone());

    let report = tester
        .run_unpaced(3, &RunDeadline::unbounded())
        .await
        .unwrap();

    assert_eq!(clock.sleeps().len(), 2);
    assert_eq!(report.total, Duration::from_millis(3 * 10 + 2 * 100));
}

#[tokio::test]
async fn test_unpaced_run_transport_failure_aborts() {
    let steps = vec![backend("server-a", 5), Step::Fail("timed out".to_string())];
    let client = ScriptedClient::new(steps);
    let mut tester = scripted_tester(test_options(), client, ManualClock::new());

    let err = tester
        .run_unpaced(20, &RunDeadline::unbounded())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Request 2 failed: timed out");
}

#[tokio::test]
async fn test_record_starts_empty_for_each_run() {
    let client = ScriptedClient::new(
        (0..4)
            .map(|_| backend("server-a", 1))
            .chain((0..4).map(|_| backend("server-b", 1))),
    );
    let mut tester = scripted_tester(test_options(), client, ManualClock::new());

    let first = tester
        .run_paced(4, &RunDeadline::unbounded())
        .await
        .unwrap();
    let second = tester
        .run_paced(4, &RunDeadline::unbounded())
        .await
        .unwrap();

    assert_eq!(first.record.to_string(), "{server-a: 4}");
    assert_eq!(second.record.to_string(), "{server-b: 4}");
    assert_eq!(tester.record().total(), 4);
}

#[tokio::test]
async fn test_issue_probe_passes_target_and_timeout() {
    let client = ScriptedClient::new(vec![backend("server-a", 1)]);
    let mut tester = scripted_tester(test_options(), client.clone(), ManualClock::new());

    let observation = tester
        .issue_probe(1, &RunDeadline::unbounded())
        .await
        .unwrap();

    assert_eq!(observation.index, 1);
    assert_eq!(observation.backend.as_deref(), Some("server-a"));
    assert_eq!(
        client.seen(),
        vec![(TEST_URL.to_string(), TEST_HEADER.to_string(), 3000)]
    );
    assert_eq!(tester.record().count("server-a"), 1);
}

#[tokio::test]
async fn test_issue_probe_without_header_records_nothing() {
    let client = ScriptedClient::new(vec![Step::NoHeader(Duration::from_millis(1))]);
    let mut tester = scripted_tester(test_options(), client, ManualClock::new());

    let observation = tester
        .issue_probe(1, &RunDeadline::unbounded())
        .await
        .unwrap();

    assert_eq!(observation.backend, None);
    assert!(tester.record().is_empty());
}

#[tokio::test]
async fn test_observer_sees_each_probe_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let client = ScriptedClient::cycling(&["server-a", "server-b", "server-c"], 6, 1);
    let mut tester = scripted_tester(test_options(), client, ManualClock::new()).with_observer(
        Box::new(move |observation: &ProbeObservation| {
            sink.lock().unwrap().push((
                observation.index,
                observation.backend.clone().unwrap_or_default(),
            ));
        }),
    );

    tester
        .run_paced(6, &RunDeadline::unbounded())
        .await
        .unwrap();

    let seen = seen.lock().unwrap().clone();
    let indices: Vec<usize> = seen.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(seen[2].1, "server-c");
}
