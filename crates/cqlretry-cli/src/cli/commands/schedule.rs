//! `cqlretry schedule <message>` – waits for a run of identical failures.

use anyhow::Result;
use cqlretry_core::retry::{DriverError, RetryDecision, RetryPolicy, RetryState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Retry { wait_ms: u64 },
    Rethrow,
    GiveUp,
}

/// One row per simulated failure; stops at the first rethrow or refusal.
pub(crate) fn simulate(policy: &RetryPolicy, message: &str, failures: u32) -> Vec<(u32, Step)> {
    let err = DriverError::server(message);
    let mut state = RetryState::new();
    let mut rows = Vec::new();
    for _ in 0..failures {
        let (decision, next) = policy.evaluate(state, &err);
        state = next;
        let step = match decision {
            RetryDecision::Rethrow => Step::Rethrow,
            RetryDecision::Retry { .. } if !policy.admits(state.attempts()) => Step::GiveUp,
            RetryDecision::Retry { .. } => {
                let wait_ms = u64::try_from(decision.delay().as_millis()).unwrap_or(u64::MAX);
                Step::Retry { wait_ms }
            }
        };
        rows.push((state.attempts(), step));
        if !matches!(step, Step::Retry { .. }) {
            break;
        }
    }
    rows
}

pub fn run_schedule(policy: &RetryPolicy, message: &str, failures: u32) -> Result<()> {
    println!("{:<8} {:<8} {}", "FAILURE", "ACTION", "WAIT");
    for (attempt, step) in simulate(policy, message, failures) {
        match step {
            Step::Retry { wait_ms } => println!("{:<8} {:<8} {} ms", attempt, "retry", wait_ms),
            Step::Rethrow => println!("{:<8} {:<8} -", attempt, "rethrow"),
            Step::GiveUp => println!("{:<8} {:<8} -", attempt, "give-up"),
        }
    }
    Ok(())
}
