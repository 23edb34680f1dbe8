use peregrine_kernel::config::SchedulerConfig;
use peregrine_kernel::jobs::{JobError, JobHandle, Scheduler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

type Log = Arc<Mutex<Vec<&'static str>>>;

fn scheduler() -> Scheduler {
    Scheduler::new(SchedulerConfig {
        parallel_threads: 2,
        worker_name: "jobs-integration".to_string(),
    })
    .unwrap()
}

fn push(log: &Log, name: &'static str) -> impl FnOnce() + Send + 'static {
    let log = Arc::clone(log);
    move || log.lock().unwrap().push(name)
}

/// Schedules a job that occupies the worker until `release` is sent, and
/// returns once it is actually running (so it is no longer in the queue).
fn occupy_worker(scheduler: &Scheduler, log: &Log) -> (JobHandle, Sender<()>) {
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx): (Sender<()>, Receiver<()>) = mpsc::channel();
    let log = Arc::clone(log);

    let gate = scheduler
        .schedule(
            move || {
                started_tx.send(()).ok();
                release_rx.recv_timeout(Duration::from_secs(10)).ok();
                log.lock().unwrap().push("gate");
            },
            JobHandle::NONE,
        )
        .unwrap();

    started_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("gate job should start");
    (gate, release_tx)
}

#[test]
fn test_independent_jobs_run_in_submission_order() {
    let scheduler = scheduler();
    let order = Arc::new(Mutex::new(Vec::new()));

    for i in 0..16 {
        let o = Arc::clone(&order);
        scheduler
            .schedule(move || o.lock().unwrap().push(i), JobHandle::NONE)
            .unwrap();
    }
    scheduler.wait_idle();

    assert_eq!(*order.lock().unwrap(), (0..16).collect::<Vec<_>>());
}

#[test]
fn test_dependent_of_queued_job_jumps_ahead_of_later_work() {
    let scheduler = scheduler();
    let log: Log = Arc::default();
    let (_gate, release) = occupy_worker(&scheduler, &log);

    let a = scheduler.schedule(push(&log, "a"), JobHandle::NONE).unwrap();
    let b = scheduler.schedule(push(&log, "b"), JobHandle::NONE).unwrap();
    let after_a = scheduler.schedule(push(&log, "after_a"), a).unwrap();

    assert_eq!(scheduler.queued(), vec![a, after_a, b]);

    release.send(()).unwrap();
    scheduler.wait_idle();
    assert_eq!(*log.lock().unwrap(), vec!["gate", "a", "after_a", "b"]);
}

#[test]
fn test_dependent_of_running_job_goes_to_queue_head() {
    let scheduler = scheduler();
    let log: Log = Arc::default();
    let (gate, release) = occupy_worker(&scheduler, &log);

    let a = scheduler.schedule(push(&log, "a"), JobHandle::NONE).unwrap();
    let b = scheduler.schedule(push(&log, "b"), JobHandle::NONE).unwrap();
    let after_gate = scheduler.schedule(push(&log, "after_gate"), gate).unwrap();

    assert_eq!(scheduler.queued(), vec![after_gate, a, b]);
    assert!(!scheduler.is_complete(after_gate).unwrap());

    release.send(()).unwrap();
    scheduler.wait(b).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["gate", "after_gate", "a", "b"]);
}

#[test]
fn test_join_job_runs_after_every_dependency() {
    let scheduler = scheduler();
    let log: Log = Arc::default();
    let (_gate, release) = occupy_worker(&scheduler, &log);

    let a = scheduler.schedule(push(&log, "a"), JobHandle::NONE).unwrap();
    let b = scheduler.schedule(push(&log, "b"), JobHandle::NONE).unwrap();
    let c = scheduler.schedule(push(&log, "c"), JobHandle::NONE).unwrap();
    let joined = scheduler.schedule_after_all(push(&log, "joined"), &[a, b]).unwrap();

    assert_eq!(scheduler.queued(), vec![a, b, joined, c]);

    release.send(()).unwrap();
    scheduler.wait(joined).unwrap();
    scheduler.wait_idle();
    assert_eq!(*log.lock().unwrap(), vec!["gate", "a", "b", "joined", "c"]);
}

#[test]
fn test_parallel_job_after_all_sees_every_write() {
    let scheduler = scheduler();
    let cells: Arc<Vec<AtomicUsize>> = Arc::new((0..64).map(|_| AtomicUsize::new(0)).collect());

    let w = Arc::clone(&cells);
    let fill = scheduler
        .schedule_parallel(move |i: usize| w[i].store(i + 1, Ordering::SeqCst), 64, JobHandle::NONE)
        .unwrap();
    let w = Arc::clone(&cells);
    let other = scheduler
        .schedule(move || { w[63].fetch_add(100, Ordering::SeqCst); }, fill)
        .unwrap();

    let sum = Arc::new(AtomicUsize::new(0));
    let (c, s) = (Arc::clone(&cells), Arc::clone(&sum));
    let reduce = scheduler
        .schedule_parallel_after_all(
            move |i: usize| {
                s.fetch_add(c[i].load(Ordering::SeqCst), Ordering::SeqCst);
            },
            64,
            &[fill, other],
        )
        .unwrap();

    scheduler.wait(reduce).unwrap();
    assert_eq!(sum.load(Ordering::SeqCst), (1..=64).sum::<usize>() + 100);
}

#[test]
fn test_panic_in_parallel_job_releases_dependents() {
    let scheduler = scheduler();
    let ran = Arc::new(AtomicUsize::new(0));

    let bad = scheduler
        .schedule_parallel(
            |i: usize| {
                if i == 3 {
                    panic!("index 3 failed");
                }
            },
            8,
            JobHandle::NONE,
        )
        .unwrap();
    let r = Arc::clone(&ran);
    let after = scheduler
        .schedule(move || { r.fetch_add(1, Ordering::SeqCst); }, bad)
        .unwrap();

    scheduler.wait(after).unwrap();
    assert!(scheduler.is_complete(bad).unwrap());
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.stats().panicked, 1);
}

#[test]
fn test_shutdown_cancels_queued_jobs() {
    let mut scheduler = scheduler();
    let log: Log = Arc::default();
    let (gate, release) = occupy_worker(&scheduler, &log);

    let queued = scheduler.schedule(push(&log, "queued"), JobHandle::NONE).unwrap();

    // Let the gate finish only after shutdown has closed the queue
    let releaser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        release.send(()).ok();
    });
    scheduler.shutdown();
    releaser.join().unwrap();

    assert!(!scheduler.is_running());
    assert!(scheduler.is_complete(gate).unwrap(), "In-flight job finishes");
    assert!(matches!(scheduler.wait(queued), Err(JobError::Cancelled(h)) if h == queued));
    assert_eq!(*log.lock().unwrap(), vec!["gate"]);
    assert_eq!(scheduler.stats().pending, 0);
}

#[test]
fn test_drop_joins_worker() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let scheduler = scheduler();
        for _ in 0..8 {
            let c = Arc::clone(&counter);
            scheduler
                .schedule(move || { c.fetch_add(1, Ordering::SeqCst); }, JobHandle::NONE)
                .unwrap();
        }
        scheduler.wait_idle();
    }
    assert_eq!(counter.load(Ordering::SeqCst), 8);
}
