//! End-to-end healing scenarios.
//!
//! These tests validate the full pipeline the way a user drives it: raw
//! error text in, FixResult out, with learned fixes surviving within the
//! process and the chain degrading tier by tier.

use std::sync::Arc;

use mend_core::memory::{FixStore, InMemoryFixStore, MemoryResolver};
use mend_core::{ChainConfig, ErrorReport, Healer, ModelTier, Signature};
use mend_models::providers::{CompletionProvider, MockProvider};

const ERROR_LOG: &str = r#"Traceback (most recent call last):
  File "main.py", line 3, in <module>
    run()
  File "api/handlers.py", line 42, in run
    return items[10]
IndexError: list index out of range"#;

struct TestSetup {
    cheap: Arc<MockProvider>,
    smart: Arc<MockProvider>,
    store: Arc<InMemoryFixStore>,
    healer: Healer,
}

fn setup() -> TestSetup {
    let cheap = Arc::new(MockProvider::new());
    let smart = Arc::new(MockProvider::new());
    let store = Arc::new(InMemoryFixStore::new());
    let resolver = Arc::new(MemoryResolver::new(
        Arc::clone(&store) as Arc<dyn FixStore>
    ));
    let healer = Healer::assemble(
        Arc::clone(&cheap) as Arc<dyn CompletionProvider>,
        Arc::clone(&smart) as Arc<dyn CompletionProvider>,
        Arc::clone(&store) as Arc<dyn FixStore>,
        resolver,
        ChainConfig::default(),
    );
    TestSetup {
        cheap,
        smart,
        store,
        healer,
    }
}

/// Same failure as [`ERROR_LOG`] reached through a different call path:
/// the raw text differs, but type, bucket, and message - the signature -
/// are identical.
const ERROR_LOG_VARIANT: &str = r#"Traceback (most recent call last):
  File "worker.py", line 19, in <module>
    process_batch()
  File "api/tasks.py", line 57, in process_batch
    first = items[10]
IndexError: list index out of range"#;

#[tokio::test]
async fn first_heal_is_paid_then_memory_takes_over_when_backends_die() {
    let t = setup();

    // First run: the cheap model answers with reusable code.
    t.cheap.queue_response(
        "Guard the index:\n```python\nif len(items) > 10:\n    return items[10]\nreturn None\n```",
    );
    let first = t.healer.heal(ERROR_LOG).await;
    assert!(first.success);
    assert_eq!(first.model_used, ModelTier::Cheap);
    assert!(first.cost > 0.0);
    assert!(first.fixed_code.is_some());

    // Both backends are now down, and the variant traceback's text differs
    // from the stored one - the exact-text check misses, both models fail,
    // and the learned fix for the shared signature answers.
    t.cheap.queue_failure("invalid token");
    t.smart.queue_failure("invalid token");

    let second = t.healer.heal(ERROR_LOG_VARIANT).await;
    assert!(second.success, "memory fallback should have answered");
    assert_eq!(second.model_used, ModelTier::Memory);
    assert_eq!(second.cost, 0.0);
    assert_eq!(t.cheap.call_count(), 2);
    assert_eq!(t.smart.call_count(), 1);
}

#[tokio::test]
async fn repeated_identical_errors_cost_exactly_one_call() {
    let t = setup();
    t.cheap.queue_response("Check bounds before indexing");

    let mut total_cost = 0.0;
    for _ in 0..5 {
        let result = t.healer.heal("IndexError: list index out of range").await;
        assert!(result.success);
        total_cost += result.cost;
    }

    assert_eq!(t.cheap.call_count(), 1);
    assert_eq!(t.smart.call_count(), 0);
    assert_eq!(total_cost, mend_core::chain::DEFAULT_CHEAP_UNIT_COST);

    // One signature in the store, bumped on every heal.
    let report = ErrorReport::parse("IndexError: list index out of range");
    let fixes = t.store.get_by_type(&report.error_type).await.unwrap();
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].success_count, 5);
}

#[tokio::test]
async fn exhausted_pipeline_fails_with_explanation_not_panic() {
    let t = setup();
    t.cheap.queue_failure("connection timed out");
    t.smart.queue_failure("503 service unavailable");

    let result = t.healer.heal("NameError: name 'frobnicate' is not defined").await;
    assert!(!result.success);
    let message = result.message.expect("failed result carries a message");
    assert!(message.contains("connection timed out"));
    assert!(message.contains("503 service unavailable"));
}

#[tokio::test]
async fn smart_tier_answers_when_cheap_is_down() {
    let t = setup();
    t.cheap.queue_failure("quota exhausted");
    t.smart.queue_response("Use try/except");

    let result = t.healer.heal("ZeroDivisionError: division by zero").await;
    assert!(result.success);
    assert_eq!(result.model_used, ModelTier::Smart);
    assert_eq!(result.cost, mend_core::chain::DEFAULT_SMART_UNIT_COST);
    assert_eq!(result.fix_strategy, "Use try/except");
}

#[tokio::test]
async fn learned_fixes_are_shared_across_files_in_one_bucket() {
    let t = setup();

    // Learn a fix for one handler file.
    let report = ErrorReport::new("IndexError", "api/handlers/foo.py", "list index out of range");
    t.cheap
        .queue_response("Clamp it:\n```python\nitems.get(10)\n```");
    t.healer.heal_report(report.clone()).await;

    // A different file in the same bucket produces the same signature, so
    // the same stored record answers and gets its count bumped.
    let sibling =
        ErrorReport::new("IndexError", "api/util/bar.py", "list index out of range");
    assert_eq!(Signature::of(&report), Signature::of(&sibling));

    let result = t.healer.heal_report(sibling).await;
    assert!(result.success);
    assert_eq!(result.model_used, ModelTier::Memory);
    assert_eq!(t.cheap.call_count(), 1);

    let fixes = t.store.get_by_type("IndexError").await.unwrap();
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].success_count, 2);
    assert_eq!(fixes[0].file_pattern, "api/*.py");
}

#[tokio::test]
async fn concurrent_heals_share_one_store_without_lost_updates() {
    let t = setup();
    let healer = Arc::new(t.healer);

    // Seed memory so every concurrent heal resolves from the exact-text
    // check and upserts the same signature.
    t.cheap.queue_response("Check bounds");
    healer.heal("IndexError: list index out of range").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let healer = Arc::clone(&healer);
        handles.push(tokio::spawn(async move {
            healer.heal("IndexError: list index out of range").await
        }));
    }
    for handle in handles {
        let result = handle.await.expect("task panicked");
        assert!(result.success);
    }

    // 1 initial + 8 concurrent upserts, none lost.
    let fixes = t.store.get_by_type("IndexError").await.unwrap();
    assert_eq!(fixes[0].success_count, 9);
}
