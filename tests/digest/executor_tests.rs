// Tests for the background executor

use std::sync::mpsc;
use std::time::Duration;

use hashcheck::digest::{AlgorithmId, AlgorithmMode, CompareEngine, Verdict};
use hashcheck::task::{Delivery, Executor, JobOutput, Sink, TaskState, Update};

type Job = Result<u32, String>;

/// Collect deliveries until the task finishes
async fn run_to_end<T: hashcheck::task::Outcome>(executor: &mut Executor<T>) -> Vec<Delivery<T>> {
    let mut out = Vec::new();
    loop {
        let delivery = tokio::time::timeout(Duration::from_secs(10), executor.next())
            .await
            .expect("task did not finish in time")
            .expect("channel closed");
        let done = !matches!(delivery.update, Update::Progress(_));
        out.push(delivery);
        if done {
            return out;
        }
    }
}

#[tokio::test]
async fn test_state_machine() {
    let mut executor: Executor<Job> = Executor::new();
    assert_eq!(executor.state(Sink::Digest), TaskState::Idle);

    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    executor.spawn(Sink::Digest, move |_| {
        let _ = gate_rx.recv();
        Ok(1)
    });
    assert_eq!(executor.state(Sink::Digest), TaskState::Running);
    assert!(executor.is_running(Sink::Digest));
    assert_eq!(executor.state(Sink::Compare), TaskState::Idle);

    gate_tx.send(()).unwrap();
    run_to_end(&mut executor).await;
    assert_eq!(executor.state(Sink::Digest), TaskState::Completed);
}

#[tokio::test]
async fn test_error_result_marks_failed() {
    let mut executor: Executor<Job> = Executor::new();
    executor.spawn(Sink::Compare, |_| Err("boom".to_string()));
    let deliveries = run_to_end(&mut executor).await;

    assert!(matches!(deliveries.last().map(|d| &d.update), Some(Update::Finished(Err(_)))));
    assert_eq!(executor.state(Sink::Compare), TaskState::Failed);
}

#[tokio::test]
async fn test_panicking_worker_marks_failed() {
    let mut executor: Executor<Job> = Executor::new();
    executor.spawn(Sink::Digest, |_| panic!("worker blew up"));
    let deliveries = run_to_end(&mut executor).await;

    assert!(matches!(deliveries.last().map(|d| &d.update), Some(Update::Failed(_))));
    assert_eq!(executor.state(Sink::Digest), TaskState::Failed);
}

#[tokio::test]
async fn test_progress_arrives_in_order_and_never_decreases() {
    let mut executor: Executor<Job> = Executor::new();
    executor.spawn(Sink::Digest, |reporter| {
        for p in [10.0, 5.0, 20.0, 20.0, 60.0, 100.0] {
            reporter.report(p);
        }
        Ok(0)
    });

    let deliveries = run_to_end(&mut executor).await;
    let progress: Vec<f64> = deliveries
        .iter()
        .filter_map(|d| match d.update {
            Update::Progress(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![10.0, 20.0, 60.0, 100.0]);
    // The result is delivered after all progress
    assert!(matches!(deliveries.last().map(|d| &d.update), Some(Update::Finished(Ok(0)))));
}

#[tokio::test]
async fn test_superseded_task_is_discarded() {
    let mut executor: Executor<Job> = Executor::new();

    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let first = executor.spawn(Sink::Digest, move |reporter| {
        let _ = gate_rx.recv();
        reporter.report(99.0);
        Ok(1)
    });
    let second = executor.spawn(Sink::Digest, |_| Ok(2));
    assert_ne!(first, second);
    assert_eq!(executor.latest(Sink::Digest), Some(second));

    let deliveries = run_to_end(&mut executor).await;
    assert!(deliveries.iter().all(|d| d.task == second));
    assert!(matches!(deliveries.last().map(|d| &d.update), Some(Update::Finished(Ok(2)))));

    // Let the stale worker finish; nothing from it may surface
    gate_tx.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(executor.poll().is_empty());
    assert_eq!(executor.state(Sink::Digest), TaskState::Completed);
}

#[tokio::test]
async fn test_sinks_are_independent() {
    let mut executor: Executor<Job> = Executor::new();
    let digest = executor.spawn(Sink::Digest, |_| Ok(1));
    let compare = executor.spawn(Sink::Compare, |_| Ok(2));

    let mut finished = Vec::new();
    while finished.len() < 2 {
        let delivery = tokio::time::timeout(Duration::from_secs(10), executor.next())
            .await
            .unwrap()
            .unwrap();
        if let Update::Finished(result) = delivery.update {
            finished.push((delivery.sink, delivery.task, result));
        }
    }
    assert!(finished.contains(&(Sink::Digest, digest, Ok(1))));
    assert!(finished.contains(&(Sink::Compare, compare, Ok(2))));
}

#[tokio::test]
async fn test_poll_does_not_block() {
    let mut executor: Executor<Job> = Executor::new();
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    executor.spawn(Sink::Digest, move |_| {
        let _ = gate_rx.recv();
        Ok(1)
    });

    // Worker is parked; poll must return immediately with nothing
    assert!(executor.poll().is_empty());
    assert!(executor.is_running(Sink::Digest));
    gate_tx.send(()).unwrap();
    run_to_end(&mut executor).await;
}

#[tokio::test]
async fn test_comparison_job_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    std::fs::write(&a, vec![1u8; 300_000]).unwrap();
    std::fs::write(&b, vec![1u8; 300_000]).unwrap();

    let mut executor: Executor<JobOutput> = Executor::new();
    executor.spawn(Sink::Compare, move |reporter| {
        let mut report = |p: f64| reporter.report(p);
        JobOutput::Verdict(CompareEngine::new().compare_files(
            Some(a.as_path()),
            Some(b.as_path()),
            AlgorithmMode::Selectable(Some(AlgorithmId::Sha256)),
            Some(&mut report),
        ))
    });

    let deliveries = run_to_end(&mut executor).await;
    let last_progress = deliveries.iter().rev().find_map(|d| match d.update {
        Update::Progress(p) => Some(p),
        _ => None,
    });
    assert_eq!(last_progress, Some(100.0));
    assert!(matches!(
        deliveries.last().map(|d| &d.update),
        Some(Update::Finished(JobOutput::Verdict(Verdict::Match)))
    ));
    assert_eq!(executor.state(Sink::Compare), TaskState::Completed);
}

#[tokio::test]
async fn test_discarded_task_delivers_nothing() {
    let mut executor: Executor<Job> = Executor::new();
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    executor.spawn(Sink::Digest, move |reporter| {
        let _ = gate_rx.recv();
        reporter.report(50.0);
        Ok(1)
    });

    executor.discard(Sink::Digest);
    assert_eq!(executor.state(Sink::Digest), TaskState::Idle);
    assert_eq!(executor.latest(Sink::Digest), None);

    gate_tx.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(executor.poll().is_empty());
    assert_eq!(executor.state(Sink::Digest), TaskState::Idle);
}
