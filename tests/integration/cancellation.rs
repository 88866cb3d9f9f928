//! External cancellation of a running batch

use crate::integration::test_utils::{driver, echo_expected, ListingEnumerator, TableExecutor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use verdict::error::ValidateError;
use verdict::pipeline::{executor_fn, PipelineConfig, PipelineDriver, PipelineState};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancel_mid_run_terminates_with_cancelled() {
    let executor =
        Arc::new(TableExecutor::echo(10_000).with_default_delay(Duration::from_millis(10)));
    let pipeline = Arc::new(driver(
        2,
        ListingEnumerator::numbered(10_000),
        Arc::clone(&executor),
    ));

    let token = pipeline.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let expected = echo_expected(10_000);
    let outcome = tokio::time::timeout(Duration::from_secs(10), pipeline.run(&expected))
        .await
        .expect("cancelled run did not terminate");

    assert!(matches!(outcome, Err(ValidateError::Cancelled)));
    assert_eq!(pipeline.state(), PipelineState::Cancelled);
    assert!(executor.calls() < 10_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancel_before_run_executes_nothing() {
    let executor = Arc::new(TableExecutor::echo(5));
    let pipeline = driver(2, ListingEnumerator::numbered(5), Arc::clone(&executor));

    pipeline.cancel();
    let err = pipeline.run(&echo_expected(5)).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(executor.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_task_finishes_before_run_returns() {
    let executor = Arc::new(TableExecutor::echo(1).with_delay("1", Duration::from_millis(200)));
    let pipeline = Arc::new(driver(1, ListingEnumerator::numbered(1), Arc::clone(&executor)));

    let token = pipeline.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let started = std::time::Instant::now();
    let err = pipeline.run(&echo_expected(1)).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(executor.calls(), 1);
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn driver_runs_at_most_once() {
    let pipeline = driver(1, ListingEnumerator::numbered(1), Arc::new(TableExecutor::echo(1)));
    pipeline.run(&echo_expected(1)).await.unwrap();

    let err = pipeline.run(&echo_expected(1)).await.unwrap_err();
    assert!(matches!(err, ValidateError::AlreadyStarted));
    assert_eq!(pipeline.state(), PipelineState::Done);
}

#[test]
fn blocking_run_is_cancelled_when_interrupt_fires() {
    let executor =
        Arc::new(TableExecutor::echo(1_000).with_default_delay(Duration::from_millis(10)));
    let pipeline = driver(2, ListingEnumerator::numbered(1_000), Arc::clone(&executor));

    let err = pipeline
        .run_blocking_until(&echo_expected(1_000), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
        })
        .unwrap_err();

    assert!(matches!(err, ValidateError::Cancelled));
    assert_eq!(pipeline.state(), PipelineState::Cancelled);
    assert!(executor.calls() < 1_000);
}

#[test]
fn blocking_run_without_interrupt_completes() {
    let pipeline = driver(2, ListingEnumerator::numbered(3), Arc::new(TableExecutor::echo(3)));
    let report = pipeline
        .run_blocking_until(&echo_expected(3), std::future::pending::<()>())
        .unwrap();
    assert!(report.all_matched());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn task_killed_by_interrupt_reports_cancelled() {
    // Stands in for a child process that dies from the same Ctrl-C as the run.
    let interrupted = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&interrupted);
    let executor = executor_fn(move |_reference| {
        while !seen.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(5));
        }
        anyhow::bail!("signal: interrupt")
    });
    let pipeline = Arc::new(
        PipelineDriver::new(
            &PipelineConfig::with_workers(1),
            Arc::new(ListingEnumerator::numbered(1)),
            Arc::new(executor),
        )
        .unwrap(),
    );

    let token = pipeline.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
        interrupted.store(true, Ordering::SeqCst);
    });

    let outcome = tokio::time::timeout(Duration::from_secs(5), pipeline.run(&echo_expected(1)))
        .await
        .expect("interrupted run did not terminate");
    assert!(matches!(outcome, Err(ValidateError::Cancelled)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn task_failure_without_cancel_is_still_reported() {
    let executor = Arc::new(TableExecutor::echo(2).failing_on("2"));
    let pipeline = driver(1, ListingEnumerator::numbered(2), executor);

    let err = pipeline.run(&echo_expected(2)).await.unwrap_err();
    assert!(matches!(err, ValidateError::Execution { .. }));
}
