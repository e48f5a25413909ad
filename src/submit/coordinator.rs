//! The send-then-poll submission loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Notify;
use tokio::time::{sleep, Instant};
use tracing::warn;

use crate::connection::{Connection, ConnectionManager, TransportError};
use crate::error::SubmitError;
use crate::instruction::{self, CallDescription, Instruction};
use crate::logging::SubmitLogger;
use crate::metrics::SubmitterMetrics;
use crate::submit::policy::{BackoffSchedule, SubmitPolicy};
use crate::types::{SubmissionReceipt, TxStatus};

/// Cooperative cancellation handle for an in-flight submission
///
/// `cancel` flips a flag and wakes the poll loop, which returns
/// `Cancelled` within one poll interval.
#[derive(Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Resolve once cancellation is requested
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            let notified = self.notify.notified();
            // Re-check: cancel() may have raced the registration above
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Drives one instruction from call description to terminal outcome
///
/// Each coordinator is independently constructible and disposable;
/// concurrent `submit` calls each own their own connection and share no
/// mutable state (the metrics counters are lock-free).
pub struct SubmissionCoordinator {
    manager: ConnectionManager,
    policy: SubmitPolicy,
    metrics: Arc<SubmitterMetrics>,
}

impl SubmissionCoordinator {
    pub fn new(manager: ConnectionManager, policy: SubmitPolicy) -> Self {
        Self {
            manager,
            policy,
            metrics: Arc::new(SubmitterMetrics::new()),
        }
    }

    pub fn with_metrics(
        manager: ConnectionManager,
        policy: SubmitPolicy,
        metrics: Arc<SubmitterMetrics>,
    ) -> Self {
        Self {
            manager,
            policy,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<SubmitterMetrics> {
        &self.metrics
    }

    pub fn policy(&self) -> &SubmitPolicy {
        &self.policy
    }

    /// Submit a call and wait for its terminal outcome
    pub async fn submit(&self, call: &CallDescription) -> Result<SubmissionReceipt, SubmitError> {
        self.submit_with_cancel(call, &CancelHandle::new()).await
    }

    /// Submit with a cancellation handle the caller may trip at any time
    pub async fn submit_with_cancel(
        &self,
        call: &CallDescription,
        cancel: &CancelHandle,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let logger = SubmitLogger::new();
        logger.log_submission_started(&call.program_id, &call.method);

        // A malformed call surfaces here, before any network traffic
        let instr = instruction::build(call)?;

        self.metrics.record_submission();
        self.metrics.inflight_inc();
        let gauge = Arc::clone(&self.metrics);
        let _inflight = scopeguard::guard((), move |_| gauge.inflight_dec());

        let outcome = async {
            let mut conn = self.manager.connect().await?;
            let result = self.run(&mut conn, &instr, cancel, &logger).await;
            self.manager.close(conn);
            result
        }
        .await;

        match &outcome {
            Ok(receipt) => {
                self.metrics.record_confirmed();
                logger.log_confirmed(&receipt.tx_id, receipt.polls, receipt.elapsed.as_millis() as u64);
            }
            Err(err) => {
                match err {
                    SubmitError::Rejected { .. } => self.metrics.record_rejected(),
                    SubmitError::Timeout { .. } => self.metrics.record_timeout(),
                    SubmitError::Cancelled => self.metrics.record_cancellation(),
                    SubmitError::Connection { .. } => self.metrics.record_connection_failure(),
                    SubmitError::Encoding { .. } => {}
                }
                logger.log_failed(err.category(), err);
            }
        }

        outcome
    }

    async fn run(
        &self,
        conn: &mut Connection,
        instr: &Instruction,
        cancel: &CancelHandle,
        logger: &SubmitLogger,
    ) -> Result<SubmissionReceipt, SubmitError> {
        if cancel.is_cancelled() {
            return Err(SubmitError::Cancelled);
        }

        let submitted_at = Utc::now();
        let started = Instant::now();
        let deadline = started + self.policy.timeout();

        // Sent exactly once; a failed send surfaces without resend
        let tx_id = conn
            .transport()
            .send_instruction(instr)
            .await
            .map_err(|e| e.into_submit_error(conn.endpoint()))?;
        logger.log_sent(&tx_id);

        let schedule = BackoffSchedule::from_policy(&self.policy);
        let mut polls: u32 = 0;
        let mut pending_polls: u32 = 0;
        let mut reconnects: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(SubmitError::Cancelled);
            }
            if Instant::now() >= deadline {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                logger.log_timeout(elapsed_ms);
                return Err(SubmitError::Timeout {
                    elapsed_ms,
                    timeout_ms: self.policy.timeout_ms,
                });
            }

            match conn.transport().query_status(&tx_id).await {
                Ok(status) => {
                    polls += 1;
                    self.metrics.record_poll();
                    match status {
                        TxStatus::Confirmed { slot } => {
                            return Ok(SubmissionReceipt {
                                tx_id,
                                slot,
                                polls,
                                submitted_at,
                                elapsed: started.elapsed(),
                            });
                        }
                        TxStatus::Rejected { reason } => {
                            logger.log_rejected(&reason);
                            return Err(SubmitError::Rejected { reason });
                        }
                        TxStatus::Pending => {}
                    }
                }
                Err(e) if e.is_transient() => {
                    self.reconnect(conn, &mut reconnects, &e, logger).await?;
                    // Fresh session: ask again right away, no backoff
                    continue;
                }
                Err(e) => return Err(e.into_submit_error(conn.endpoint())),
            }

            // Suspend until the next poll, racing the cancel signal and
            // never sleeping past the deadline
            let delay = schedule.delay_for(pending_polls);
            pending_polls += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::select! {
                _ = sleep(delay.min(remaining)) => {}
                _ = cancel.cancelled() => return Err(SubmitError::Cancelled),
            }
        }
    }

    /// Replace a dropped session, consuming the per-submission budget
    ///
    /// Failed dials consume budget too; the counter never resets within
    /// one submission.
    async fn reconnect(
        &self,
        conn: &mut Connection,
        reconnects: &mut u32,
        cause: &TransportError,
        logger: &SubmitLogger,
    ) -> Result<(), SubmitError> {
        let mut last_error = cause.to_string();

        while *reconnects < self.policy.max_reconnect_attempts {
            *reconnects += 1;
            self.metrics.record_reconnect();
            logger.log_reconnect(*reconnects, self.policy.max_reconnect_attempts);

            match self.manager.connect().await {
                Ok(fresh) => {
                    let stale = std::mem::replace(conn, fresh);
                    self.manager.close(stale);
                    return Ok(());
                }
                Err(e) => {
                    warn!(attempt = *reconnects, error = %e, "Reconnect dial failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(SubmitError::connection(
            conn.endpoint().url.clone(),
            format!(
                "reconnect budget exhausted after {} attempt(s): {}",
                self.policy.max_reconnect_attempts, last_error
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_handle_wakes_waiters() {
        let handle = CancelHandle::new();
        assert!(!handle.is_cancelled());

        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });

        handle.cancel();
        assert!(handle.is_cancelled());
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_before_wait_resolves_immediately() {
        let handle = CancelHandle::new();
        handle.cancel();
        // Must not hang even though cancel() preceded the wait
        handle.cancelled().await;
    }
}
