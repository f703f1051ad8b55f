//! Retry Patterns Example
//!
//! Walks through the ways a `RetryPolicy` can be shaped:
//! - Timeout growth with the built-in backoff schedules
//! - Retrying only transient errors
//! - Slow attempts abandoned and retried
//! - Guarding a constructor with precondition checks
//!
//! Run with: cargo run --example retry_patterns --features tracing

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bulwark::prelude::*;

// ==================== Backoff Schedules ====================

/// Example 1: Per-attempt timeouts produced by each schedule
fn example_backoff_schedules() {
    println!("\n=== Example 1: Backoff Schedules ===");

    let base = Duration::from_millis(100);
    let schedules = [
        ("constant", Backoff::constant(base)),
        ("linear", Backoff::linear(base)),
        ("exponential", Backoff::exponential(base)),
        ("fibonacci", Backoff::fibonacci(base)),
        ("exponential, capped at 1s", Backoff::exponential(base).with_max(Duration::from_secs(1))),
    ];

    for (name, backoff) in schedules {
        let timeouts: Vec<_> = (0..6).map(|attempt| backoff.timeout_for(attempt)).collect();
        println!("  {:<26} {:?}", name, timeouts);
    }
}

// ==================== Conditional Retry ====================

#[derive(Debug, Clone, PartialEq)]
enum ApiError {
    RateLimited,
    Unauthorized,
}

/// Example 2: Only rate limiting is worth another attempt
async fn example_conditional_retry() {
    println!("\n=== Example 2: Conditional Retry ===");

    let policy = RetryPolicy::with_max_attempts(5)
        .and_then(|p| p.with_retry_predicate(|e: &ApiError| *e == ApiError::RateLimited));
    let policy = match policy {
        Ok(policy) => policy,
        Err(e) => {
            println!("  Invalid policy: {}", e);
            return;
        }
    };

    for (label, failure) in [("rate limited", ApiError::RateLimited), ("unauthorized", ApiError::Unauthorized)] {
        let calls = Arc::new(AtomicU32::new(0));
        let result = policy
            .execute({
                let calls = calls.clone();
                move || {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(failure.clone())
                    } else {
                        Ok("payload")
                    }
                }
            })
            .await;

        println!(
            "  {}: {:?} after {} call(s)",
            label,
            result,
            calls.load(Ordering::SeqCst)
        );
    }
}

// ==================== Timeouts ====================

/// Example 3: A service that gets faster as it warms up
async fn example_slow_attempts() {
    println!("\n=== Example 3: Slow Attempts ===");

    let policy = RetryPolicy::<ApiError>::with_max_attempts(3)
        .and_then(|p| p.with_backoff_strategy(Backoff::constant(Duration::from_millis(150))))
        .and_then(|p| p.abort_on_timeout(true));
    let policy = match policy {
        Ok(policy) => policy,
        Err(e) => {
            println!("  Invalid policy: {}", e);
            return;
        }
    };

    let calls = Arc::new(AtomicU32::new(0));
    let result = policy
        .execute_async({
            let calls = calls.clone();
            move || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    // 400ms, 200ms, then 0ms
                    let latency = Duration::from_millis(400u64.saturating_sub(200 * n as u64));
                    tokio::time::sleep(latency).await;
                    Ok(latency)
                }
            }
        })
        .await;

    match result {
        Ok(latency) => println!("  Answered in {:?} on call {}", latency, calls.load(Ordering::SeqCst)),
        Err(e) => println!("  Gave up: {:?}", e),
    }

    let hopeless = policy
        .execute_async(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
    if let Err(e) = hopeless {
        println!("  Hopeless service: {:?}", e);
    }
}

// ==================== Preconditions ====================

struct Client {
    endpoint: String,
    policy: RetryPolicy<ApiError>,
}

impl Client {
    fn new(endpoint: Option<&str>, attempts: u32) -> Result<Self, PreconditionError> {
        let endpoint = check_not_null!(endpoint, "endpoint")?;
        check_argument!(
            endpoint.starts_with("https://"),
            "endpoint",
            "endpoint must use https, got {}",
            endpoint
        )?;
        let policy = RetryPolicy::with_max_attempts(attempts)?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            policy,
        })
    }
}

/// Example 4: Rejecting bad configuration up front
fn example_preconditions() {
    println!("\n=== Example 4: Preconditions ===");

    let inputs = [
        (Some("https://api.example.com"), 3),
        (Some("http://api.example.com"), 3),
        (None, 3),
        (Some("https://api.example.com"), 0),
    ];
    for (endpoint, attempts) in inputs {
        match Client::new(endpoint, attempts) {
            Ok(client) => println!(
                "  {} with {} attempt(s)",
                client.endpoint,
                client.policy.max_attempts()
            ),
            Err(e) => println!("  Rejected: {}", e),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("======================================");
    println!("       Retry Patterns Example         ");
    println!("======================================");

    example_backoff_schedules();
    example_conditional_retry().await;
    example_slow_attempts().await;
    example_preconditions();

    println!("\n======================================");
    println!("           Examples Complete           ");
    println!("======================================");
}
