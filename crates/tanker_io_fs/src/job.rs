//! Background flatten-copy job.
//!
//! A front end that must stay responsive runs the copy here and drains the
//! event channel: one `Skipped` per notice, then exactly one `Finished`.

use std::io;
use std::path::PathBuf;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info};

use crate::flatten::flatten_copy_with_sink;
use crate::report::ReportFlatten;
use crate::spec::{FlattenCopyError, SpecFlattenOptions, SpecSkipNotice};

/// Maximum number of events that may queue up before the worker blocks.
pub const EVENT_CHANNEL_CAPACITY: usize = 1_024;

/// Events sent from the worker thread to the caller.
#[derive(Debug)]
pub enum FlattenEvent {
    /// An item was skipped (excluded, conflicting or overlapping).
    Skipped(SpecSkipNotice),
    /// The run is over. Always the last event.
    Finished(Result<ReportFlatten, FlattenCopyError>),
}

/// Handle to a running or completed flatten-copy job.
pub struct FlattenCopyHandle {
    /// Receiver for events from the worker thread.
    pub event_rx: Receiver<FlattenEvent>,
    path_dir_source: PathBuf,
    thread: Option<thread::JoinHandle<()>>,
}

impl FlattenCopyHandle {
    /// Block until the job finishes, forwarding skip notices to `on_skip`.
    ///
    /// A worker that dies before sending `Finished` is reported as
    /// [`FlattenCopyError::Filesystem`] on the source directory.
    pub fn wait<F>(mut self, mut on_skip: F) -> Result<ReportFlatten, FlattenCopyError>
    where
        F: FnMut(&SpecSkipNotice),
    {
        let mut res_final = None;
        for event in self.event_rx.iter() {
            match event {
                FlattenEvent::Skipped(notice) => on_skip(&notice),
                FlattenEvent::Finished(res) => {
                    res_final = Some(res);
                    break;
                }
            }
        }

        let b_worker_panicked = self
            .thread
            .take()
            .is_some_and(|handle| handle.join().is_err());

        res_final.unwrap_or_else(|| {
            let message = if b_worker_panicked {
                "flatten worker panicked"
            } else {
                "flatten worker exited without a result"
            };
            Err(FlattenCopyError::filesystem(
                &self.path_dir_source,
                io::Error::other(message),
            ))
        })
    }
}

/// Start a flatten-copy on a background thread.
///
/// Fails only if the OS refuses to spawn the worker thread.
pub fn start_flatten_copy(options: SpecFlattenOptions) -> io::Result<FlattenCopyHandle> {
    let (event_tx, event_rx) = crossbeam_channel::bounded::<FlattenEvent>(EVENT_CHANNEL_CAPACITY);
    let path_dir_source = options.dir_source.clone();

    let thread = thread::Builder::new()
        .name("tanker-flatten".into())
        .spawn(move || run_job(&options, &event_tx))?;

    Ok(FlattenCopyHandle {
        event_rx,
        path_dir_source,
        thread: Some(thread),
    })
}

fn run_job(options: &SpecFlattenOptions, event_tx: &Sender<FlattenEvent>) {
    info!("Flatten worker started");
    let res = flatten_copy_with_sink(options, &mut |notice: &SpecSkipNotice| {
        // Receiver gone means nobody is listening; keep copying regardless.
        let _ = event_tx.send(FlattenEvent::Skipped(notice.clone()));
    });
    if event_tx.send(FlattenEvent::Finished(res)).is_err() {
        debug!("Flatten result dropped: receiver disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_is_marshalled_back() {
        let handle = start_flatten_copy(SpecFlattenOptions::default()).expect("spawn");
        let mut n_notices = 0;
        let err = handle.wait(|_| n_notices += 1).expect_err("must fail");
        assert!(err.is_validation());
        assert_eq!(n_notices, 0);
    }

    #[test]
    fn finished_is_the_last_event() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        std::fs::create_dir_all(src.join("a")).expect("mkdir");
        std::fs::write(src.join("a/x.txt"), "x").expect("write");
        std::fs::write(src.join("a/y.txt"), "y").expect("write");

        let options = SpecFlattenOptions::new(&src, &dst).with_excluded(["x.txt", "y.txt"]);
        let handle = start_flatten_copy(options).expect("spawn");

        let l_events: Vec<FlattenEvent> = handle.event_rx.iter().collect();
        assert_eq!(l_events.len(), 3);
        assert!(matches!(l_events[0], FlattenEvent::Skipped(_)));
        assert!(matches!(l_events[1], FlattenEvent::Skipped(_)));
        match &l_events[2] {
            FlattenEvent::Finished(Ok(report)) => assert_eq!(report.cnt_skipped, 2),
            other => panic!("unexpected last event: {other:?}"),
        }
    }

    #[test]
    fn worker_panic_is_reported_on_source_directory() {
        let (event_tx, event_rx) = crossbeam_channel::bounded::<FlattenEvent>(1);
        let thread = thread::spawn(move || {
            let _ = event_tx.send(FlattenEvent::Skipped(SpecSkipNotice {
                path_item: "src/a/x.txt".into(),
                path_destination: "dst/x.txt".into(),
                reason: crate::spec::EnumSkipReason::Excluded,
            }));
            panic!("worker died");
        });
        let handle = FlattenCopyHandle {
            event_rx,
            path_dir_source: PathBuf::from("src"),
            thread: Some(thread),
        };

        let mut n_notices = 0;
        let err = handle.wait(|_| n_notices += 1).expect_err("must fail");
        assert_eq!(n_notices, 1);
        match err {
            FlattenCopyError::Filesystem { path, source } => {
                assert_eq!(path, PathBuf::from("src"));
                assert_eq!(source.to_string(), "flatten worker panicked");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
