//! Ordering and comparison guarantees of a completed run

use crate::integration::test_utils::{driver, echo_expected, ListingEnumerator, TableExecutor};
use std::sync::Arc;
use std::time::Duration;
use verdict::pipeline::{ExpectedValues, PipelineState, Report};

fn ids(report: &Report) -> Vec<u32> {
    report.lines.iter().map(|line| line.id.get()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn report_lines_ascend_by_id() {
    let executor = Arc::new(TableExecutor::echo(20));
    let pipeline = driver(4, ListingEnumerator::numbered(20), Arc::clone(&executor));

    let report = pipeline.run(&echo_expected(20)).await.unwrap();

    assert_eq!(ids(&report), (1..=20).collect::<Vec<_>>());
    assert!(report.all_matched());
    assert_eq!(executor.calls(), 20);
    assert_eq!(pipeline.state(), PipelineState::Done);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn completion_order_does_not_affect_report() {
    // Early ids are the slowest, so they finish last.
    let executor = Arc::new(
        TableExecutor::echo(6)
            .with_delay("1", Duration::from_millis(120))
            .with_delay("2", Duration::from_millis(80))
            .with_delay("3", Duration::from_millis(40)),
    );
    let pipeline = driver(6, ListingEnumerator::numbered(6), executor);

    let report = pipeline.run(&echo_expected(6)).await.unwrap();
    assert_eq!(ids(&report), vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn discovery_order_does_not_affect_report() {
    let listing = ListingEnumerator::new(["5", "3", "1", "4", "2"]);
    let pipeline = driver(3, listing, Arc::new(TableExecutor::echo(5)));

    let report = pipeline.run(&echo_expected(5)).await.unwrap();
    assert_eq!(ids(&report), vec![1, 2, 3, 4, 5]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_count_does_not_change_report_lines() {
    let mut reports = Vec::new();
    for workers in [1, 2, 8] {
        let executor =
            Arc::new(TableExecutor::echo(12).with_default_delay(Duration::from_millis(2)));
        let pipeline = driver(workers, ListingEnumerator::numbered(12), executor);
        reports.push(pipeline.run(&echo_expected(12)).await.unwrap().lines);
    }

    assert_eq!(reports[0], reports[1]);
    assert_eq!(reports[1], reports[2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mismatch_is_isolated_to_its_task() {
    let executor = Arc::new(TableExecutor::new([("1", "42\n"), ("2", "7\n"), ("3", "7\n")]));
    let pipeline = driver(3, ListingEnumerator::numbered(3), executor);
    let expected: ExpectedValues = ["42", "7", "8"].into_iter().collect();

    let report = pipeline.run(&expected).await.unwrap();

    let rendered: Vec<String> = report.lines.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "1 correct (42 == 42)",
            "2 correct (7 == 7)",
            "3 incorrect (7 != 8)",
        ]
    );
    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_trailing_newline_is_stripped() {
    let executor = Arc::new(TableExecutor::new([
        ("1", "a\n\n"),
        ("2", "b"),
        ("3", "c\r\n"),
    ]));
    let pipeline = driver(2, ListingEnumerator::numbered(3), executor);
    let expected: ExpectedValues = ["a\n", "b", "c\r"].into_iter().collect();

    let report = pipeline.run(&expected).await.unwrap();
    assert!(report.all_matched());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn empty_batch_produces_empty_report() {
    let listing = ListingEnumerator::new(Vec::<String>::new());
    let pipeline = driver(4, listing, Arc::new(TableExecutor::echo(0)));

    let report = pipeline.run(&ExpectedValues::default()).await.unwrap();
    assert!(report.is_empty());
    assert_eq!(pipeline.state(), PipelineState::Done);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unselected_entries_are_skipped() {
    let listing = ListingEnumerator::new(["1", "validate", "2", "README"]);
    let executor = Arc::new(TableExecutor::echo(2));
    let pipeline = driver(2, listing, Arc::clone(&executor));

    let report = pipeline.run(&echo_expected(2)).await.unwrap();
    assert_eq!(ids(&report), vec![1, 2]);
    assert_eq!(executor.calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sequential_ids_follow_selection_order() {
    let listing = ListingEnumerator::new(["seq:b", "skip-me", "seq:a"]);
    let executor = Arc::new(TableExecutor::new([("seq:b", "first\n"), ("seq:a", "second\n")]));
    let pipeline = driver(2, listing, executor);
    let expected: ExpectedValues = ["first", "second"].into_iter().collect();

    let report = pipeline.run(&expected).await.unwrap();
    assert_eq!(ids(&report), vec![1, 2]);
    assert!(report.all_matched());
}

#[test]
fn run_blocking_outside_runtime() {
    let pipeline = driver(3, ListingEnumerator::numbered(9), Arc::new(TableExecutor::echo(9)));
    let report = pipeline.run_blocking(&echo_expected(9)).unwrap();
    assert_eq!(report.len(), 9);
    assert!(report.all_matched());
}
