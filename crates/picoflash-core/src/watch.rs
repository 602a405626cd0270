//! Watch mode
//!
//! Watches a source tree and re-runs compile-then-flash on changes.
//! Bursts of notifications collapse into one trigger per debounce
//! window, and triggered runs go through a single-slot queue to one
//! worker thread: at most one run executes at a time, at most one more
//! is queued behind it, and anything beyond that is dropped. Two runs
//! can never touch the device concurrently.

use std::sync::mpsc::{self, RecvTimeoutError, TrySendError};
use std::thread;
use std::time::{Duration, Instant};

use notify::{Event, RecursiveMode, Watcher};

use crate::abort::AbortFlag;
use crate::config::{Capabilities, FlashConfig};
use crate::error::WatchError;

/// Source file extensions that trigger a rebuild
const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "h", "hpp"];

/// Collapses bursts of triggers into one per window (leading edge)
struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Accept a trigger at `now`, or drop it as part of a burst
    fn accept(&mut self, now: Instant) -> bool {
        match self.last {
            Some(prev) if now.duration_since(prev) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

fn is_source_event(event: &Event) -> bool {
    event.paths.iter().any(|path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    })
}

/// Run watch mode until the abort flag is set
///
/// `on_trigger` executes on a dedicated worker thread, once per
/// accepted trigger. The idle loop wakes once per poll interval to
/// check the abort flag even when no events arrive.
pub fn run<F>(
    config: &FlashConfig,
    caps: Capabilities,
    abort: AbortFlag,
    on_trigger: F,
) -> Result<(), WatchError>
where
    F: FnMut() + Send + 'static,
{
    if !caps.watch {
        return Err(WatchError::Unavailable);
    }

    let source_dir = &config.source_dir;
    if !source_dir.is_dir() {
        return Err(WatchError::Backend {
            path: source_dir.clone(),
            message: "not a directory".to_string(),
        });
    }

    let (event_tx, event_rx) = mpsc::channel();
    let mut watcher =
        notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                let _ = event_tx.send(event);
            }
            Err(e) => log::warn!("Watch error: {}", e),
        })
        .map_err(|e| WatchError::Backend {
            path: source_dir.clone(),
            message: e.to_string(),
        })?;

    watcher
        .watch(source_dir, RecursiveMode::Recursive)
        .map_err(|e| WatchError::Backend {
            path: source_dir.clone(),
            message: e.to_string(),
        })?;

    log::info!("Watching {} for source changes", source_dir.display());

    // Single-slot queue serializing flash runs.
    let (work_tx, work_rx) = mpsc::sync_channel::<()>(1);
    let worker = thread::spawn(move || {
        let mut on_trigger = on_trigger;
        while work_rx.recv().is_ok() {
            on_trigger();
        }
    });

    let mut debouncer = Debouncer::new(config.debounce_window);

    loop {
        if abort.is_set() {
            log::info!("Stopping watch mode");
            break;
        }
        match event_rx.recv_timeout(config.poll_interval) {
            Ok(event) => {
                if !is_source_event(&event) {
                    continue;
                }
                if !debouncer.accept(Instant::now()) {
                    continue;
                }
                log::info!("Source change detected");
                match work_tx.try_send(()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(())) => {
                        log::debug!("Flash run already queued, dropping trigger")
                    }
                    Err(TrySendError::Disconnected(())) => break,
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    drop(watcher);
    drop(work_tx);
    let _ = worker.join();
    Ok(())
}
