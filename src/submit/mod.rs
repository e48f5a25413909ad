//! Submission coordination
//!
//! Sends a built instruction over an active connection and polls for
//! confirmation under a retry/timeout policy:
//! - **policy**: timeout, poll interval, backoff schedule, reconnect budget
//! - **coordinator**: the send-then-poll loop, reconnect handling, and
//!   cooperative cancellation
//!
//! The loop distinguishes three worlds and applies a different rule to
//! each: a rejection is definitive and surfaces immediately, a pending
//! status means wait and ask again, and a transient transport fault is
//! absorbed by reconnecting up to the policy budget. The instruction is
//! sent exactly once per submission; resubmission is a new caller-initiated
//! operation.

mod coordinator;
mod policy;

pub use coordinator::{CancelHandle, SubmissionCoordinator};
pub use policy::{BackoffSchedule, SubmitPolicy};
