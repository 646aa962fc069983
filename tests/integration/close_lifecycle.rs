//! Close tasks run exactly once, whichever way a context's life ends

use super::test_utils::{Call, RecordingStore};
use parking_lot::Mutex;
use remote_naming::context::{RemoteContext, StoreLease};
use remote_naming::{Context, Name};
use std::sync::{Arc, Barrier};
use std::thread;

type Log = Arc<Mutex<Vec<(&'static str, bool)>>>;

fn task(log: &Log, id: &'static str) -> impl Fn(bool) -> anyhow::Result<()> + Send + Sync {
    let log = Arc::clone(log);
    move |is_finalize: bool| -> anyhow::Result<()> {
        log.lock().push((id, is_finalize));
        Ok(())
    }
}

fn context_with_tasks(log: &Log) -> RemoteContext {
    RemoteContext::builder(RecordingStore::new())
        .close_task(task(log, "T1"))
        .close_task(task(log, "T2"))
        .build()
}

#[test]
fn test_explicit_close_runs_tasks_in_order_once() {
    let log: Log = Arc::default();
    let ctx = context_with_tasks(&log);

    ctx.close();
    ctx.close();
    assert!(ctx.is_closed());
    drop(ctx);

    assert_eq!(*log.lock(), vec![("T1", false), ("T2", false)]);
}

/// Two threads close the same context at once; one wins, the other does nothing
#[test]
fn test_concurrent_close_has_single_winner() {
    for _ in 0..50 {
        let log: Log = Arc::default();
        let ctx = Arc::new(context_with_tasks(&log));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    ctx.close();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        drop(ctx);

        assert_eq!(*log.lock(), vec![("T1", false), ("T2", false)]);
    }
}

#[test]
fn test_drop_without_close_finalizes() {
    let log: Log = Arc::default();
    let ctx = context_with_tasks(&log);
    drop(ctx);

    assert_eq!(*log.lock(), vec![("T1", true), ("T2", true)]);
}

/// The last handle can only drop after every other holder is gone, so a close
/// on another thread always wins over the drop path.
#[test]
fn test_close_on_other_thread_then_drop_runs_tasks_once() {
    for _ in 0..50 {
        let log: Log = Arc::default();
        let ctx = Arc::new(context_with_tasks(&log));
        let closer = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || ctx.close())
        };
        drop(ctx);
        closer.join().unwrap();

        assert_eq!(*log.lock(), vec![("T1", false), ("T2", false)]);
    }
}

#[test]
fn test_failing_task_does_not_stop_later_tasks() {
    let log: Log = Arc::default();
    let ctx = RemoteContext::builder(RecordingStore::new())
        .close_task(task(&log, "first"))
        .close_task(|_: bool| -> anyhow::Result<()> { anyhow::bail!("cannot release") })
        .close_task(task(&log, "last"))
        .build();

    ctx.close();
    assert_eq!(*log.lock(), vec![("first", false), ("last", false)]);
}

/// The handle from lookup("") owns none of the original's tasks
#[test]
fn test_empty_lookup_handle_is_independent() {
    let log: Log = Arc::default();
    let ctx = context_with_tasks(&log);

    let sibling = ctx.lookup(&Name::empty()).unwrap();
    let sibling = sibling.into_context().unwrap();
    sibling.close();
    drop(sibling);
    assert!(log.lock().is_empty());
    assert_eq!(ctx.pending_close_tasks(), 2);

    ctx.close();
    assert_eq!(log.lock().len(), 2);
}

#[test]
fn test_add_close_task_after_construction() {
    let log: Log = Arc::default();
    let ctx = context_with_tasks(&log);
    assert!(ctx.add_close_task(task(&log, "T3")));

    ctx.close();
    assert_eq!(
        *log.lock(),
        vec![("T1", false), ("T2", false), ("T3", false)]
    );

    assert!(!ctx.add_close_task(task(&log, "late")));
    assert_eq!(log.lock().last(), Some(&("late", false)));
}

#[test]
fn test_store_lease_closes_store_when_last_context_closes() {
    let store = RecordingStore::new();
    let lease = StoreLease::acquire(store.clone());
    let first = RemoteContext::builder(store.clone())
        .close_task(lease.clone())
        .build();
    let second = RemoteContext::builder(store.clone())
        .close_task(lease.clone())
        .build();
    lease.release().unwrap();

    first.close();
    assert!(!store.calls().contains(&Call::Close));

    drop(second);
    assert_eq!(store.last_call(), Some(Call::Close));
}
