use log::{debug, warn};
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::error::Error;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, channel};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub const DEBOUNCE_INTERVAL: Duration = Duration::from_secs(1);

pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Leading edge: the first event once the interval has passed fires, later
/// ones inside the window are dropped.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    last_trigger: Instant,
}

impl Debouncer {
    pub fn new(interval: Duration, started: Instant) -> Self {
        Self {
            interval,
            last_trigger: started,
        }
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_trigger) >= self.interval {
            self.last_trigger = now;
            true
        } else {
            false
        }
    }
}

pub fn is_write_event(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}

/// Held for the whole of a rebuild. Shutdown takes it too, so the process
/// never exits halfway through writing the output tree.
#[derive(Clone, Default)]
pub struct RebuildLock(Arc<Mutex<()>>);

impl RebuildLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.acquire();
        f()
    }
}

pub struct DirWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    debouncer: Debouncer,
}

impl DirWatcher {
    pub fn new(dirs: &[PathBuf]) -> Result<Self, Box<dyn Error>> {
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(tx, Config::default())?;

        for dir in dirs {
            if !dir.is_dir() {
                debug!("Not watching {}, no such directory", dir.display());
                continue;
            }
            watcher
                .watch(dir, RecursiveMode::Recursive)
                .map_err(|error| format!("Error watching {}: {error}", dir.display()))?;
            debug!("Watching {}", dir.display());
        }

        Ok(Self {
            _watcher: watcher,
            events: rx,
            debouncer: Debouncer::new(DEBOUNCE_INTERVAL, Instant::now()),
        })
    }

    pub fn run(mut self, on_change: impl FnMut()) {
        dispatch_events(&self.events, &mut self.debouncer, on_change);
    }
}

pub fn dispatch_events(
    events: impl IntoIterator<Item = notify::Result<Event>>,
    debouncer: &mut Debouncer,
    mut on_change: impl FnMut(),
) {
    for result in events {
        let event = match result {
            Ok(event) => event,
            Err(error) => {
                warn!("Watch error: {error}");
                continue;
            }
        };

        if is_write_event(&event) && debouncer.ready(Instant::now()) {
            std::thread::sleep(SETTLE_DELAY);
            on_change();
        }
    }
}
