//! Integration tests for resumable-rs.

use parking_lot::Mutex;
use resumable_rs::{
    attach_assign, attach_sink, AssignMode, AtomicCell, Completion, Demand, DemandLimits,
    PassthroughSubject, PublisherExt, ResumableHandle, Sequence, SubscriptionStatus, WriteTarget,
};
use std::convert::Infallible;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Default)]
struct Screen {
    value: AtomicCell<i32>,
    trace: Mutex<Vec<i32>>,
}

/// A view that owns the handle of the subscriber writing into it.
#[derive(Default)]
struct View {
    value: AtomicCell<i32>,
    handle: Mutex<Option<ResumableHandle>>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn recorder() -> (Arc<Mutex<Vec<i32>>>, impl FnMut(i32) + Send + 'static) {
    let values = Arc::new(Mutex::new(Vec::new()));
    let sink_values = Arc::clone(&values);
    (values, move |value| sink_values.lock().push(value))
}

#[test]
fn test_pull_on_first_value_then_pause_until_resume() {
    let (values, mut record) = recorder();
    let mut first = true;
    let handle = attach_sink(
        Sequence::new([1, 2, 3]),
        move |value| {
            record(value);
            std::mem::replace(&mut first, false)
        },
        |_| {},
    );

    // the first value asks for the second one, which then pauses
    assert_eq!(*values.lock(), vec![1, 2]);
    handle.resume();
    assert_eq!(*values.lock(), vec![1, 2, 3]);
    assert!(handle.is_terminated());
}

#[test]
fn test_paused_sink_waits_for_each_resume() {
    let (values, mut record) = recorder();
    let handle = attach_sink(
        Sequence::new([1, 2, 3]),
        move |value| {
            record(value);
            false
        },
        |_| {},
    );

    assert_eq!(*values.lock(), vec![1]);
    handle.resume();
    assert_eq!(*values.lock(), vec![1, 2]);
    handle.resume();
    assert_eq!(*values.lock(), vec![1, 2, 3]);
}

#[test]
fn test_always_pulling_sink_issues_a_single_request() {
    init_tracing();
    let monitor = Sequence::new(1..=100).monitor_demand(
        DemandLimits::default()
            .with_max_demand(Demand::ONE)
            .with_panic_on_violation(false),
    );
    let report = monitor.report();
    let (values, mut record) = recorder();
    let _handle = monitor.resumable_sink(
        move |value| {
            record(value);
            true
        },
        |_| {},
    );

    assert_eq!(values.lock().len(), 100);
    assert_eq!(report.requests(), vec![Demand::ONE]);
    assert!(report.is_clean());
}

#[test]
fn test_each_resume_pulls_exactly_one_value() {
    let monitor = Sequence::new(1..=10).monitor_demand(DemandLimits::default().with_panic_on_violation(false));
    let report = monitor.report();
    let (values, mut record) = recorder();
    let handle = monitor.resumable_sink(
        move |value| {
            record(value);
            false
        },
        |_| {},
    );

    handle.resume();
    handle.resume();
    handle.resume();

    // a synchronous source delivers inside the first resume, which pauses
    // again, so every resume pulls exactly one value
    assert_eq!(*values.lock(), vec![1, 2, 3, 4]);
    assert_eq!(report.total_requested(), Demand::max(4));
}

#[test]
fn test_resume_while_pull_pending_is_noop() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let monitor = subject.clone().monitor_demand(DemandLimits::default().with_panic_on_violation(false));
    let report = monitor.report();
    let (values, mut record) = recorder();
    let handle = monitor.resumable_sink(
        move |value| {
            record(value);
            false
        },
        |_| {},
    );

    // nothing sent yet, the initial pull is still outstanding
    handle.resume();
    handle.resume();
    assert_eq!(report.requests(), vec![Demand::ONE]);

    subject.send(1);
    handle.resume();
    handle.resume();
    assert_eq!(report.requests(), vec![Demand::ONE, Demand::ONE]);
    assert_eq!(*values.lock(), vec![1]);
}

#[test]
fn test_paused_sink_misses_values_sent_meanwhile() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let (values, mut record) = recorder();
    let handle = subject.clone().resumable_sink(
        move |value| {
            record(value);
            false
        },
        |_| {},
    );

    subject.send(1);
    subject.send(2);
    handle.resume();
    subject.send(3);

    assert_eq!(*values.lock(), vec![1, 3]);
}

#[test]
fn test_failure_forwarded_to_completion_handler() {
    let subject = PassthroughSubject::<i32, String>::new();
    let completion = Arc::new(Mutex::new(None));
    let sink_completion = Arc::clone(&completion);
    let handle = subject.clone().resumable_sink(
        |_| true,
        move |result| *sink_completion.lock() = Some(result),
    );

    subject.send(1);
    subject.send_completion(Completion::Failure("broken pipe".to_string()));

    assert_eq!(*completion.lock(), Some(Completion::Failure("broken pipe".to_string())));
    assert_eq!(handle.status(), SubscriptionStatus::Terminal);

    // terminal: both are silent no-ops
    handle.resume();
    handle.cancel();
}

#[test]
fn test_dropping_handle_cancels() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let (values, mut record) = recorder();
    let handle = subject.clone().resumable_sink(
        move |value| {
            record(value);
            true
        },
        |_| {},
    );

    subject.send(1);
    assert_eq!(subject.subscriber_count(), 1);

    drop(handle);
    assert_eq!(subject.subscriber_count(), 0);
    assert_eq!(subject.send(2), 0);
    assert_eq!(*values.lock(), vec![1]);
}

#[test]
fn test_cancel_does_not_run_completion_handler() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let completed = Arc::new(Mutex::new(false));
    let sink_completed = Arc::clone(&completed);
    let handle = subject.clone().resumable_sink(|_| true, move |_| *sink_completed.lock() = true);

    handle.cancel();
    subject.send_completion(Completion::Finished);

    assert!(!*completed.lock());
    assert!(handle.is_terminated());
}

#[test]
fn test_resumer_outlives_handle_harmlessly() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let handle = subject.clone().resumable_sink(|_| false, |_| {});
    let resumer = handle.resumer();

    subject.send(1);
    assert!(resumer.resume());

    drop(handle);
    assert!(!resumer.resume());
}

#[test]
fn test_assign_all_the_time_traces_every_value() {
    let screen = Arc::new(Screen::default());
    let _handle = attach_assign(
        Sequence::new([1, 2, 3]),
        Arc::clone(&screen),
        WriteTarget::setter(|screen: &Screen, value| {
            screen.value.store(value);
            screen.trace.lock().push(value);
        }),
        AssignMode::SingleDemandAllTheTime,
    );

    assert_eq!(*screen.trace.lock(), vec![1, 2, 3]);
    assert_eq!(screen.value.load(), 3);
}

#[test]
fn test_assign_then_stop_holds_value_until_resume() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let screen = Arc::new(Screen::default());
    let handle = subject.clone().resumable_assign(
        Arc::clone(&screen),
        WriteTarget::field(|screen: &Screen| &screen.value),
        AssignMode::SingleDemandThenStop,
    );

    subject.send(1);
    subject.send(2);
    assert_eq!(screen.value.load(), 1);

    handle.resume();
    assert_eq!(screen.value.load(), 1);
    subject.send(3);
    assert_eq!(screen.value.load(), 3);
}

#[test]
fn test_assign_releases_target_on_completion() {
    let screen = Arc::new(Screen::default());
    let handle = Sequence::new([5]).resumable_assign(
        Arc::clone(&screen),
        WriteTarget::field(|screen: &Screen| &screen.value),
        AssignMode::SingleDemandAllTheTime,
    );

    assert!(handle.is_terminated());
    assert_eq!(Arc::strong_count(&screen), 1);
    assert_eq!(screen.value.load(), 5);
}

#[test]
fn test_assign_releases_target_on_drop() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let screen = Arc::new(Screen::default());
    let handle = subject.clone().resumable_assign(
        Arc::clone(&screen),
        WriteTarget::field(|screen: &Screen| &screen.value),
        AssignMode::SingleDemandAllTheTime,
    );
    assert_eq!(Arc::strong_count(&screen), 2);

    drop(handle);
    assert_eq!(Arc::strong_count(&screen), 1);
    assert_eq!(subject.subscriber_count(), 0);
}

#[test]
fn test_resume_through_handle_stored_in_target() {
    let view = Arc::new(View::default());
    let handle = attach_assign(
        Sequence::new([1, 2, 3]),
        Arc::clone(&view),
        WriteTarget::field(|view: &View| &view.value),
        AssignMode::SingleDemandThenStop,
    );
    *view.handle.lock() = Some(handle);
    assert_eq!(view.value.load(), 1);

    let (done, observed) = mpsc::channel();
    let resuming = Arc::clone(&view);
    thread::spawn(move || {
        for _ in 0..2 {
            if let Some(handle) = resuming.handle.lock().as_ref() {
                handle.resume();
            }
            done.send(resuming.value.load()).expect("test thread gone");
        }
    });

    let values: Vec<_> = (0..2)
        .map(|_| observed.recv_timeout(Duration::from_secs(3)).expect("resume through the target blocked"))
        .collect();
    assert_eq!(values, vec![2, 3]);

    // the last value completes the sequence, which releases the view
    let handle = view.handle.lock().take().expect("handle stored");
    assert!(handle.is_terminated());
}

#[test]
fn test_resume_while_caller_holds_a_target_field() {
    let screen = Arc::new(Screen::default());
    let handle = attach_assign(
        Sequence::new([1, 2]),
        Arc::clone(&screen),
        WriteTarget::field(|screen: &Screen| &screen.value),
        AssignMode::SingleDemandThenStop,
    );

    let (done, observed) = mpsc::channel();
    let observer = Arc::clone(&screen);
    thread::spawn(move || {
        let mut trace = observer.trace.lock();
        trace.push(observer.value.load());
        handle.resume();
        trace.push(observer.value.load());
        done.send(trace.to_vec()).expect("test thread gone");
    });

    let trace = observed.recv_timeout(Duration::from_secs(3)).expect("resume while holding the trace blocked");
    assert_eq!(trace, vec![1, 2]);
}

#[test]
fn test_concurrent_resumes_pull_one_value() {
    init_tracing();
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let monitor = subject.clone().monitor_demand(DemandLimits::default().with_panic_on_violation(false));
    let report = monitor.report();
    let handle = monitor.resumable_sink(|_| false, |_| {});

    subject.send(1);
    let resumer = handle.resumer();
    let threads: Vec<_> = (0..8)
        .map(|_| {
            let resumer = resumer.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    resumer.resume();
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().expect("resume thread panicked");
    }

    // initial pull plus exactly one resume
    assert_eq!(report.total_requested(), Demand::max(2));
}

#[test]
fn test_concurrent_cancel_and_resume_terminate_cleanly() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let handle = subject.clone().resumable_sink(|_| false, |_| {});
    let resumer = handle.resumer();

    let resuming = thread::spawn(move || {
        for _ in 0..1_000 {
            resumer.resume();
        }
    });
    for _ in 0..10 {
        handle.cancel();
    }
    resuming.join().expect("resume thread panicked");

    assert!(handle.is_terminated());
    assert_eq!(subject.subscriber_count(), 0);
}
