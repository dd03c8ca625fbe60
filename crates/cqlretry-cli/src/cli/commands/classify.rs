//! `cqlretry classify <message>` – run one error message through the policy.

use anyhow::Result;
use cqlretry_core::retry::{DriverError, ErrorClass, RetryPolicy, RetryState, RetryType};
use serde::Serialize;

#[derive(Debug, PartialEq, Eq, Serialize)]
pub(crate) struct ClassifyReport {
    pub class: &'static str,
    pub retry_type: &'static str,
    pub attempts: u32,
    pub admitted: bool,
    pub wait_ms: Option<u64>,
}

pub(crate) fn class_name(class: &ErrorClass) -> &'static str {
    match class {
        ErrorClass::RateLimited { .. } => "rate_limited",
        ErrorClass::Transient => "transient",
        ErrorClass::Fatal => "fatal",
    }
}

pub(crate) fn classify_report(
    policy: &RetryPolicy,
    message: &str,
    attempts: u32,
) -> ClassifyReport {
    let err = DriverError::server(message);
    let retry_type = match policy.retry_type(&err) {
        RetryType::Retry => "retry",
        RetryType::Rethrow => "rethrow",
    };
    ClassifyReport {
        class: class_name(&policy.classify(&err)),
        retry_type,
        attempts,
        admitted: policy.admits(attempts),
        wait_ms: policy
            .retry_after(RetryState::with_attempts(attempts), message)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
    }
}

pub fn run_classify(policy: &RetryPolicy, message: &str, attempts: u32, json: bool) -> Result<()> {
    let report = classify_report(policy, message, attempts);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("class:      {}", report.class);
    println!("retry type: {}", report.retry_type);
    let admission = if report.admitted { "admitted" } else { "over cap" };
    println!("attempts:   {} ({})", report.attempts, admission);
    match report.wait_ms {
        Some(ms) => println!("wait:       {ms} ms"),
        None => println!("wait:       -"),
    }
    Ok(())
}
