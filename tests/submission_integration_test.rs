//! End-to-end submission flows against a scripted endpoint
//!
//! Time is paused: tokio auto-advances the clock through the poll-loop
//! sleeps, so these tests assert exact poll and dial counts without real
//! waiting.

use std::sync::Arc;
use std::time::Duration;

use ferry::testkit::{harness, initialize_call, test_program_id, StatusScript};
use ferry::{ArgKind, ArgValue, CallDescription, SubmitError, SubmitPolicy};

fn fast_policy() -> SubmitPolicy {
    SubmitPolicy {
        jitter_factor: 0.0,
        ..SubmitPolicy::default()
    }
}

#[tokio::test(start_paused = true)]
async fn confirms_after_exactly_k_polls() {
    let (coordinator, transport, connector) = harness(
        StatusScript::ConfirmAfter {
            polls: 4,
            slot: 1234,
        },
        fast_policy(),
    );

    let receipt = coordinator.submit(&initialize_call()).await.unwrap();

    assert_eq!(receipt.polls, 4);
    assert_eq!(receipt.slot, Some(1234));
    assert_eq!(transport.sends(), 1);
    // No further queries once the terminal answer arrived
    assert_eq!(transport.queries(), 4);
    assert_eq!(connector.dials(), 1);

    let snap = coordinator.metrics().snapshot();
    assert_eq!(snap.submissions, 1);
    assert_eq!(snap.confirmed, 1);
    assert_eq!(snap.status_polls, 4);
    assert_eq!(snap.inflight, 0);
}

#[tokio::test(start_paused = true)]
async fn rejection_surfaces_immediately_without_reconnect() {
    let (coordinator, transport, connector) = harness(
        StatusScript::RejectWith {
            reason: "custom program error: 0x1".to_string(),
        },
        fast_policy(),
    );

    let err = coordinator.submit(&initialize_call()).await.unwrap_err();

    match err {
        SubmitError::Rejected { reason } => assert!(reason.contains("0x1")),
        other => panic!("expected Rejected, got {:?}", other),
    }
    assert_eq!(transport.queries(), 1);
    assert_eq!(connector.dials(), 1);
    assert_eq!(coordinator.metrics().snapshot().rejected, 1);
    assert_eq!(coordinator.metrics().snapshot().reconnects, 0);
}

#[tokio::test(start_paused = true)]
async fn transient_faults_recover_within_reconnect_budget() {
    let (coordinator, transport, connector) = harness(
        StatusScript::TransientThenConfirm {
            failures: 2,
            polls_after: 1,
            slot: 77,
        },
        fast_policy(),
    );

    let receipt = coordinator.submit(&initialize_call()).await.unwrap();

    assert_eq!(receipt.slot, Some(77));
    // Two dropped queries, then the fresh session confirmed on its first
    assert_eq!(receipt.polls, 1);
    assert_eq!(transport.queries(), 3);
    // One initial connect plus two reconnects, within the budget of 3
    assert_eq!(connector.dials(), 3);
    assert_eq!(coordinator.metrics().snapshot().reconnects, 2);
    assert_eq!(transport.sends(), 1);
}

#[tokio::test(start_paused = true)]
async fn persistent_transient_faults_exhaust_budget() {
    let (coordinator, transport, connector) = harness(
        StatusScript::TransientThenConfirm {
            failures: 100,
            polls_after: 1,
            slot: 0,
        },
        fast_policy(),
    );

    let err = coordinator.submit(&initialize_call()).await.unwrap_err();

    match err {
        SubmitError::Connection { message, .. } => {
            assert!(message.contains("reconnect budget exhausted"));
        }
        other => panic!("expected Connection, got {:?}", other),
    }
    // Initial connect plus exactly max_reconnect_attempts re-dials
    assert_eq!(connector.dials(), 4);
    assert_eq!(coordinator.metrics().snapshot().reconnects, 3);
    // The instruction was never resent despite the faults
    assert_eq!(transport.sends(), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_returns_within_policy_window() {
    let policy = SubmitPolicy {
        timeout_ms: 1_000,
        jitter_factor: 0.0,
        ..SubmitPolicy::default()
    };
    let (coordinator, transport, _connector) = harness(StatusScript::NeverConfirm, policy);

    let started = tokio::time::Instant::now();
    let err = coordinator.submit(&initialize_call()).await.unwrap_err();
    let waited = started.elapsed();

    match err {
        SubmitError::Timeout {
            elapsed_ms,
            timeout_ms,
        } => {
            assert_eq!(timeout_ms, 1_000);
            assert!(elapsed_ms >= 1_000);
        }
        other => panic!("expected Timeout, got {:?}", other),
    }
    // Tolerance: the deadline plus at most one poll interval
    assert!(waited <= Duration::from_millis(1_500), "waited {:?}", waited);
    assert_eq!(transport.sends(), 1);
    assert_eq!(coordinator.metrics().snapshot().timeouts, 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_the_poll_sleep() {
    let (coordinator, transport, _connector) =
        harness(StatusScript::NeverConfirm, fast_policy());
    let coordinator = Arc::new(coordinator);

    let cancel = ferry::CancelHandle::new();
    let submit_cancel = cancel.clone();
    let submitting = Arc::clone(&coordinator);
    let task = tokio::spawn(async move {
        submitting
            .submit_with_cancel(&initialize_call(), &submit_cancel)
            .await
    });

    // Let the submission reach its first backoff sleep, then trip it
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, SubmitError::Cancelled));
    assert_eq!(transport.sends(), 1);
    assert_eq!(coordinator.metrics().snapshot().cancellations, 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_send_performs_no_io() {
    let (coordinator, transport, _connector) =
        harness(StatusScript::NeverConfirm, fast_policy());

    let cancel = ferry::CancelHandle::new();
    cancel.cancel();

    let err = coordinator
        .submit_with_cancel(&initialize_call(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Cancelled));
    assert_eq!(transport.sends(), 0);
}

#[tokio::test(start_paused = true)]
async fn encoding_errors_surface_before_any_io() {
    let (coordinator, transport, connector) = harness(
        StatusScript::ConfirmAfter { polls: 1, slot: 0 },
        fast_policy(),
    );

    // Declares one integer parameter but supplies none
    let call = CallDescription::new(
        test_program_id(),
        "initialize",
        vec![ArgKind::Integer],
        vec![],
    );

    let err = coordinator.submit(&call).await.unwrap_err();

    assert!(matches!(err, SubmitError::Encoding { .. }));
    assert_eq!(connector.dials(), 0);
    assert_eq!(transport.sends(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_submissions_each_own_a_connection() {
    let (coordinator, transport, connector) = harness(
        StatusScript::ConfirmAfter { polls: 1, slot: 5 },
        fast_policy(),
    );
    let coordinator = Arc::new(coordinator);

    let a = {
        let c = Arc::clone(&coordinator);
        tokio::spawn(async move { c.submit(&initialize_call()).await })
    };
    let b = {
        let c = Arc::clone(&coordinator);
        let call = CallDescription::new(
            test_program_id(),
            "transfer",
            vec![ArgKind::Integer],
            vec![ArgValue::Integer(10)],
        );
        tokio::spawn(async move { c.submit(&call).await })
    };

    let (ra, rb) = (a.await.unwrap(), b.await.unwrap());
    assert!(ra.is_ok() && rb.is_ok());

    assert_eq!(transport.sends(), 2);
    assert_eq!(connector.dials(), 2);
    let snap = coordinator.metrics().snapshot();
    assert_eq!(snap.confirmed, 2);
    assert_eq!(snap.inflight, 0);
}
