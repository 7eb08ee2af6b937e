//! Drives a scan across every configured location.
//!
//! ```text
//! Idle ──▶ Enumerating ──▶ Dispatching ──▶ Draining ──▶ Done
//!              │  (per location)   │
//!              └── Failed(location) ┘  recorded, scanning continues
//! ```
//!
//! Containers are opened, enumerated and read on the calling thread. Each
//! accepted entry becomes a parse task; the descriptor it yields is shared
//! by one task per applicable scanner. With a worker pool the tasks run on
//! the pool and the end of the pool scope is the drain barrier; without one
//! they run inline. Both produce the same store.
//!
//! At most a few entries per worker wait on the pool at once; past that the
//! calling thread processes the next entry itself before reading more.

use crate::config::{Configuration, Executor};
use crate::error::ClassdexError;
use crate::scanner::{ScanInput, Scanner};
use crate::store::{Partition, Store};
use crate::vfs::{Dir, Entry, Location, read_entry};
use classdex_plugin::ClassDescriptor;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Entries allowed on the pool per worker before the caller helps out
const JOBS_PER_WORKER: usize = 4;

/// Phases of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Enumerating,
    Dispatching,
    Draining,
    Done,
    /// Side branch for a location that could not be opened; the scan goes on
    Failed(String),
}

/// Category of a recorded failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    NoMatchingContainerType,
    UnreadableContainer,
    MalformedArtifact,
    ScanTaskFailure,
}

/// One thing that was skipped during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub kind: FailureKind,
    pub location: String,
    pub entry: Option<String>,
    pub scanner: Option<String>,
    pub message: String,
}

impl ScanFailure {
    fn for_location(location: &Location, error: &ClassdexError) -> Self {
        let kind = match error {
            ClassdexError::NoMatchingContainerType { .. } => FailureKind::NoMatchingContainerType,
            _ => FailureKind::UnreadableContainer,
        };
        Self {
            kind,
            location: location.to_string(),
            entry: None,
            scanner: None,
            message: error.to_string(),
        }
    }

    fn malformed(location: &str, entry: &Entry, reason: String) -> Self {
        let error = ClassdexError::MalformedArtifact {
            entry: entry.relative_path().to_string(),
            reason,
        };
        Self {
            kind: FailureKind::MalformedArtifact,
            location: location.to_string(),
            entry: Some(entry.relative_path().to_string()),
            scanner: None,
            message: error.to_string(),
        }
    }

    fn task(location: &str, entry: &Entry, scanner: &str, reason: String) -> Self {
        let error = ClassdexError::ScanTaskFailure {
            entry: entry.relative_path().to_string(),
            scanner: scanner.to_string(),
            reason,
        };
        Self {
            kind: FailureKind::ScanTaskFailure,
            location: location.to_string(),
            entry: Some(entry.relative_path().to_string()),
            scanner: Some(scanner.to_string()),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

/// What a scan did and what it had to skip.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Configured locations
    pub locations: usize,
    /// Locations opened and enumerated
    pub scanned_locations: usize,
    /// Entries handed to at least one scanner
    pub dispatched_entries: usize,
    /// Entries rejected by the input filter
    pub filtered_entries: usize,
    pub failures: Vec<ScanFailure>,
    pub workers: usize,
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures_of(&self, kind: FailureKind) -> impl Iterator<Item = &ScanFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }
}

/// One accepted entry, read and ready for parsing.
struct EntryJob {
    location: Arc<str>,
    entry: Entry,
    bytes: Option<Vec<u8>>,
    /// Indices into the scanner list
    scanners: Vec<usize>,
}

/// Shared, read-only view handed to every task.
struct TaskContext<'a> {
    config: &'a Configuration,
    sinks: Vec<(Arc<dyn Scanner>, Arc<Partition>)>,
    failures: Mutex<Vec<ScanFailure>>,
    /// Jobs spawned on the pool and not yet parsed
    in_flight: AtomicUsize,
}

impl TaskContext<'_> {
    fn record(&self, failure: ScanFailure) {
        warn!("{}", failure);
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(failure);
    }

    /// Parse once; `None` when no scanner needs a descriptor or parsing failed.
    fn parse(&self, job: &EntryJob) -> Option<Arc<ClassDescriptor>> {
        let bytes = job.bytes.as_ref()?;
        let parser = &self.config.parser;
        match catch_unwind(AssertUnwindSafe(|| parser.parse(bytes))) {
            Ok(Ok(descriptor)) => Some(Arc::new(descriptor)),
            Ok(Err(e)) => {
                self.record(ScanFailure::malformed(&job.location, &job.entry, e.to_string()));
                None
            }
            Err(payload) => {
                self.record(ScanFailure::malformed(
                    &job.location,
                    &job.entry,
                    format!("parser {} panicked: {}", parser.name(), panic_message(&*payload)),
                ));
                None
            }
        }
    }

    /// Scanners of `job` that can run given the parse outcome
    fn runnable(&self, job: &EntryJob, descriptor: Option<&ClassDescriptor>) -> Vec<usize> {
        let parsed = descriptor.is_some();
        job.scanners
            .iter()
            .copied()
            .filter(|&i| parsed || !self.sinks[i].0.requires_descriptor())
            .collect()
    }

    fn run_scanner(
        &self,
        location: &str,
        entry: &Entry,
        descriptor: Option<&ClassDescriptor>,
        index: usize,
    ) {
        let (scanner, sink) = &self.sinks[index];
        let input = ScanInput::new(entry, descriptor);
        let reason = match catch_unwind(AssertUnwindSafe(|| scanner.scan(&input, sink))) {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("panicked: {}", panic_message(&*payload)),
        };
        self.record(ScanFailure::task(location, entry, scanner.name(), reason));
    }

    fn process_inline(&self, job: EntryJob) {
        let descriptor = self.parse(&job);
        for index in self.runnable(&job, descriptor.as_deref()) {
            self.run_scanner(&job.location, &job.entry, descriptor.as_deref(), index);
        }
    }

    /// Parses on the current worker and fans scanners out; the entry's bytes
    /// are released on return.
    fn process_pooled<'scope>(&'scope self, job: EntryJob, scope: &rayon::Scope<'scope>) {
        let descriptor = self.parse(&job);
        let location = job.location.clone();
        let entry = Arc::new(job.entry.clone());
        for index in self.runnable(&job, descriptor.as_deref()) {
            let descriptor = descriptor.clone();
            let location = location.clone();
            let entry = entry.clone();
            scope.spawn(move |_| {
                self.run_scanner(&location, &entry, descriptor.as_deref(), index);
            });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs one scan of `config` into `store`.
pub struct ScanPipeline<'a> {
    config: &'a Configuration,
    state: ScanState,
}

impl<'a> ScanPipeline<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self {
            config,
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    fn transition(&mut self, next: ScanState) {
        debug!("scan state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Scan every location into `store`. Never fails: whatever could not be
    /// scanned is listed in the returned report.
    pub fn run(&mut self, store: &Store) -> ScanReport {
        let start = Instant::now();
        let config = self.config;
        let mut report = ScanReport {
            locations: config.locations.len(),
            workers: config.executor.workers(),
            ..ScanReport::default()
        };

        if config.locations.is_empty() {
            warn!(
                "{}; set them via ConfigurationBuilder::set_locations",
                ClassdexError::EmptyLocationSet
            );
            self.transition(ScanState::Done);
            report.elapsed = start.elapsed();
            return report;
        }

        debug!("going to scan these locations: {:?}", config.locations);
        let ctx = TaskContext {
            config,
            sinks: config
                .scanners
                .iter()
                .map(|s| (s.clone(), store.partition(s.name())))
                .collect(),
            failures: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        };

        self.transition(ScanState::Enumerating);
        match &config.executor {
            Executor::Sequential => {
                self.enumerate(&ctx, &mut report, |job| ctx.process_inline(job));
                self.transition(ScanState::Draining);
            }
            Executor::Pool(pool) => {
                let ctx = &ctx;
                let limit = pool.current_num_threads().max(1) * JOBS_PER_WORKER;
                pool.in_place_scope(|scope| {
                    self.enumerate(ctx, &mut report, |job| {
                        if ctx.in_flight.load(Ordering::Acquire) >= limit {
                            ctx.process_inline(job);
                            return;
                        }
                        ctx.in_flight.fetch_add(1, Ordering::AcqRel);
                        scope.spawn(move |scope| {
                            ctx.process_pooled(job, scope);
                            ctx.in_flight.fetch_sub(1, Ordering::AcqRel);
                        });
                    });
                    self.transition(ScanState::Draining);
                });
            }
        }

        report.failures = ctx
            .failures
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        report.elapsed = start.elapsed();
        self.transition(ScanState::Done);

        info!(
            "scanned {} of {} locations in {} ms, producing {} keys and {} values ({} failures, {} workers)",
            report.scanned_locations,
            report.locations,
            report.elapsed.as_millis(),
            store.keys_count(),
            store.values_count(),
            report.failures.len(),
            report.workers
        );
        report
    }

    fn enumerate(
        &mut self,
        ctx: &TaskContext<'_>,
        report: &mut ScanReport,
        mut dispatch: impl FnMut(EntryJob),
    ) {
        let config = self.config;
        for location in &config.locations {
            let mut dir = match config.url_types.from_location(location) {
                Ok(dir) => dir,
                Err(e) => {
                    self.transition(ScanState::Failed(location.to_string()));
                    ctx.record(ScanFailure::for_location(location, &e));
                    self.transition(ScanState::Enumerating);
                    continue;
                }
            };

            self.transition(ScanState::Dispatching);
            let location_name: Arc<str> = Arc::from(location.as_str());
            let entries: Vec<Entry> = dir.entries().collect();
            for entry in entries {
                if !config
                    .input_filter
                    .as_ref()
                    .is_none_or(|f| f.accepts(&entry.input_name()))
                {
                    report.filtered_entries += 1;
                    continue;
                }

                if let Some(job) = prepare(ctx, dir.as_ref(), &location_name, entry) {
                    report.dispatched_entries += 1;
                    dispatch(job);
                }
            }

            dir.close();
            report.scanned_locations += 1;
            self.transition(ScanState::Enumerating);
        }
    }
}

/// Pick the scanners for `entry` and read its bytes if any of them needs a
/// descriptor. `None` when no scanner wants the entry or it cannot be read.
fn prepare(
    ctx: &TaskContext<'_>,
    dir: &dyn Dir,
    location: &Arc<str>,
    entry: Entry,
) -> Option<EntryJob> {
    let path = entry.relative_path();
    let scanners: Vec<usize> = ctx
        .sinks
        .iter()
        .enumerate()
        .filter(|(_, (scanner, _))| scanner.accepts_input(path))
        .map(|(i, _)| i)
        .collect();
    if scanners.is_empty() {
        return None;
    }

    let needs_descriptor = scanners.iter().any(|&i| ctx.sinks[i].0.requires_descriptor());
    let bytes = if needs_descriptor {
        match read_entry(dir, &entry) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                ctx.record(ScanFailure::malformed(
                    location,
                    &entry,
                    format!("could not read entry: {}", e),
                ));
                return None;
            }
        }
    } else {
        None
    };

    Some(EntryJob {
        location: location.clone(),
        entry,
        bytes,
        scanners,
    })
}

/// Scan `config` into `store`; see [`ScanPipeline`].
pub fn scan(config: &Configuration, store: &Store) -> ScanReport {
    ScanPipeline::new(config).run(store)
}
