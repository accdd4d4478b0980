//! Scenario data loader: parse, join and aggregate one scenario.
//!
//! [`load_metrics_with_progress`] runs the pipeline on the caller's thread.
//! [`ScenarioDataLoader`] runs it in the background: the scenario file and the
//! reference table are parsed on two worker threads, and the join only starts
//! once both have reported back. Every request bumps a generation counter and
//! a result is published only while its generation is still the current one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use cscc_core::{CountryCode, Scenario, ensure_finite};
use cscc_data::{
    DataQualityWarning, ParseSummary, ReferenceTable, RowError, ScenarioBatch, ScenarioFilter,
    load_reference_table, load_scenario_rows,
};
use cscc_metrics::range::{DEFAULT_RANGE_ETA, DEFAULT_RANGE_PRTP};
use cscc_metrics::{DistributionRange, MetricSet, aggregate, country_range_filter, join_reference};
use tracing::{debug, info, warn};

use crate::config::LoaderConfig;
use crate::error::{AppError, AppResult};
use crate::progress::{LoadProgressEvent, LoadStage};

/// Which scenario to load, optionally narrowed to one country.
///
/// The country narrows the published metric list further than the configured
/// allow-list, never past it. The world row and the aggregate members are
/// still read from the full scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScenarioRequest {
    pub scenario: Scenario,
    pub country: Option<CountryCode>,
}

impl ScenarioRequest {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            country: None,
        }
    }

    pub fn with_country(mut self, country: CountryCode) -> Self {
        self.country = Some(country);
        self
    }
}

#[derive(Debug, Clone)]
pub struct LoadedMetrics {
    pub request: ScenarioRequest,
    pub metrics: MetricSet,
    pub warnings: Vec<DataQualityWarning>,
    /// Scenario and reference rows that could not be typed.
    pub rejected: Vec<RowError>,
    pub scenario_summary: ParseSummary,
    pub reference_summary: ParseSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(LoadProgressEvent)>,
    scenario: Scenario,
    stage: LoadStage,
    started: Instant,
    message: Option<String>,
    rows_read: Option<usize>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        let elapsed_wall_s = started.elapsed().as_secs_f64();
        cb(LoadProgressEvent {
            rows_read,
            ..LoadProgressEvent::stage(scenario, stage, elapsed_wall_s, message)
        });
    }
}

fn parse_scenario(config: &LoaderConfig, request: &ScenarioRequest) -> AppResult<ScenarioBatch> {
    let filter = ScenarioFilter::builder()
        .scenario(&request.scenario, &config.fixed_prtp)
        .build()?;
    let batch = load_scenario_rows(
        config.scenario_source(&request.scenario),
        &filter,
        &config.fixed_prtp,
    )?;
    Ok(batch)
}

fn parse_reference(config: &LoaderConfig) -> AppResult<ReferenceTable> {
    Ok(load_reference_table(config.reference_source())?)
}

/// Published codes for a request: the requested country, but only when the
/// configured allow-list admits it.
fn narrow_allow_list(
    allow_list: Option<&[CountryCode]>,
    country: Option<CountryCode>,
) -> Option<Vec<CountryCode>> {
    match (allow_list, country) {
        (Some(allowed), Some(country)) => {
            Some(allowed.iter().copied().filter(|&code| code == country).collect())
        }
        (None, Some(country)) => Some(vec![country]),
        (allowed, None) => allowed.map(<[CountryCode]>::to_vec),
    }
}

/// Join, aggregate and publish once both sources are in.
fn finish(
    config: &LoaderConfig,
    request: ScenarioRequest,
    batch: ScenarioBatch,
    reference: ReferenceTable,
    progress_cb: &mut Option<&mut dyn FnMut(LoadProgressEvent)>,
    started: Instant,
) -> LoadedMetrics {
    let options = config.metric_options();

    emit_progress(
        progress_cb,
        request.scenario,
        LoadStage::Joining,
        started,
        Some(format!("Joining {} rows", batch.rows.len())),
        None,
    );
    let joined = join_reference(&batch.rows, &reference, options.world_code);

    emit_progress(
        progress_cb,
        request.scenario,
        LoadStage::Aggregating,
        started,
        None,
        None,
    );
    let aggregate = options
        .aggregate
        .as_ref()
        .map(|group| aggregate(&batch.rows, &reference, group, options.world_code));

    let allow_list = narrow_allow_list(options.allow_list.as_deref(), request.country);
    let metrics = MetricSet::from_parts(joined, allow_list.as_deref(), aggregate);

    let mut rejected = batch.rejected;
    rejected.extend(reference.rejected.iter().cloned());

    LoadedMetrics {
        request,
        metrics,
        warnings: batch.warnings,
        rejected,
        scenario_summary: batch.summary,
        reference_summary: reference.summary.clone(),
    }
}

/// Load one scenario on the caller's thread.
pub fn load_metrics(config: &LoaderConfig, request: &ScenarioRequest) -> AppResult<LoadedMetrics> {
    load_metrics_with_progress(config, request, None)
}

/// Load one scenario on the caller's thread, reporting each stage.
pub fn load_metrics_with_progress(
    config: &LoaderConfig,
    request: &ScenarioRequest,
    mut progress_cb: Option<&mut dyn FnMut(LoadProgressEvent)>,
) -> AppResult<LoadedMetrics> {
    let started = Instant::now();
    let scenario = request.scenario;

    emit_progress(
        &mut progress_cb,
        scenario,
        LoadStage::ResolvingPaths,
        started,
        Some("Resolving scenario file".to_string()),
        None,
    );
    let scenario_source = config.scenario_source(&scenario);

    emit_progress(
        &mut progress_cb,
        scenario,
        LoadStage::ParsingScenario,
        started,
        Some(scenario_source.describe()),
        None,
    );
    let batch = parse_scenario(config, request)?;
    emit_progress(
        &mut progress_cb,
        scenario,
        LoadStage::ParsingScenario,
        started,
        Some(format!("{} scenario rows kept", batch.rows.len())),
        Some(batch.summary.rows_read),
    );

    emit_progress(
        &mut progress_cb,
        scenario,
        LoadStage::ParsingReference,
        started,
        Some(config.reference_source().describe()),
        None,
    );
    let reference = parse_reference(config)?;
    emit_progress(
        &mut progress_cb,
        scenario,
        LoadStage::ParsingReference,
        started,
        Some(format!("{} reference rows", reference.len())),
        Some(reference.summary.rows_read),
    );

    let loaded = finish(config, *request, batch, reference, &mut progress_cb, started);

    emit_progress(
        &mut progress_cb,
        scenario,
        LoadStage::Completed,
        started,
        Some(format!("{} metrics", loaded.metrics.metrics.len())),
        None,
    );
    info!(
        scenario = %scenario,
        metrics = loaded.metrics.metrics.len(),
        elapsed_s = started.elapsed().as_secs_f64(),
        "scenario loaded"
    );
    Ok(loaded)
}

/// Percentile bands of one country across all scenarios, from the full
/// dataset file.
pub fn load_country_range(
    config: &LoaderConfig,
    country: CountryCode,
    clamp_override: Option<f64>,
) -> AppResult<DistributionRange> {
    let clamp_override = clamp_override
        .map(|clamp| ensure_finite(clamp, "clamp override"))
        .transpose()?;
    let filter = country_range_filter(country, DEFAULT_RANGE_PRTP, DEFAULT_RANGE_ETA)?;
    let range = cscc_metrics::load_country_range(
        config.dataset_source(),
        &filter,
        country,
        &config.fixed_prtp,
        clamp_override,
    )?;
    Ok(range)
}

#[derive(Debug, Clone)]
pub enum LoaderState {
    Idle,
    Loading {
        generation: u64,
        request: ScenarioRequest,
    },
    Ready {
        generation: u64,
        loaded: Arc<LoadedMetrics>,
    },
    Failed {
        generation: u64,
        error: Arc<AppError>,
    },
}

impl LoaderState {
    pub fn generation(&self) -> Option<u64> {
        match self {
            LoaderState::Idle => None,
            LoaderState::Loading { generation, .. }
            | LoaderState::Ready { generation, .. }
            | LoaderState::Failed { generation, .. } => Some(*generation),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoaderState::Loading { .. })
    }

    pub fn metrics(&self) -> Option<&MetricSet> {
        match self {
            LoaderState::Ready { loaded, .. } => Some(&loaded.metrics),
            _ => None,
        }
    }
}

/// Completion notice sent once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderMessage {
    Ready { generation: u64 },
    Failed { generation: u64, message: String },
    /// A newer request was made before this one finished; its result was dropped.
    Superseded { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
}

enum Parsed {
    Scenario(AppResult<ScenarioBatch>),
    Reference(AppResult<ReferenceTable>),
}

/// Block until both sources have reported, in either order. The first
/// failure ends the wait.
fn gather(
    rx: &Receiver<Parsed>,
    timeout: Option<Duration>,
) -> AppResult<(ScenarioBatch, ReferenceTable)> {
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut scenario = None;
    let mut reference = None;

    while scenario.is_none() || reference.is_none() {
        let parsed = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(remaining) {
                    Ok(parsed) => parsed,
                    Err(RecvTimeoutError::Timeout) => {
                        let waited = timeout.unwrap_or_default().as_millis();
                        return Err(AppError::Timeout {
                            waited_ms: u64::try_from(waited).unwrap_or(u64::MAX),
                        });
                    }
                    Err(RecvTimeoutError::Disconnected) => return Err(AppError::WorkerLost),
                }
            }
            None => rx.recv().map_err(|_| AppError::WorkerLost)?,
        };
        match parsed {
            Parsed::Scenario(result) => scenario = Some(result?),
            Parsed::Reference(result) => reference = Some(result?),
        }
    }

    match (scenario, reference) {
        (Some(scenario), Some(reference)) => Ok((scenario, reference)),
        _ => Err(AppError::WorkerLost),
    }
}

struct Shared {
    config: LoaderConfig,
    generation: AtomicU64,
    state: Mutex<LoaderState>,
    settled: Condvar,
    notify: Option<Sender<LoaderMessage>>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn run_fetch(&self, generation: u64, request: ScenarioRequest) {
        if !self.is_current(generation) {
            self.settle(generation, Err(AppError::WorkerLost));
            return;
        }
        let outcome = self.fetch(request);
        self.settle(generation, outcome);
    }

    fn fetch(&self, request: ScenarioRequest) -> AppResult<LoadedMetrics> {
        let started = Instant::now();
        let (tx, rx) = mpsc::channel();

        let scenario_tx = tx.clone();
        let scenario_config = self.config.clone();
        thread::spawn(move || {
            let result = parse_scenario(&scenario_config, &request);
            let _ = scenario_tx.send(Parsed::Scenario(result));
        });

        let reference_config = self.config.clone();
        thread::spawn(move || {
            let result = parse_reference(&reference_config);
            let _ = tx.send(Parsed::Reference(result));
        });

        let (batch, reference) = gather(&rx, self.config.fetch_timeout())?;
        Ok(finish(&self.config, request, batch, reference, &mut None, started))
    }

    /// Publish an outcome unless a newer request has been made since.
    fn settle(&self, generation: u64, outcome: AppResult<LoadedMetrics>) {
        let message = {
            let mut state = self.lock_state();
            if !self.is_current(generation) {
                debug!(generation, "discarding stale fetch result");
                LoaderMessage::Superseded { generation }
            } else {
                match outcome {
                    Ok(loaded) => {
                        info!(
                            generation,
                            metrics = loaded.metrics.metrics.len(),
                            "scenario fetch ready"
                        );
                        *state = LoaderState::Ready {
                            generation,
                            loaded: Arc::new(loaded),
                        };
                        LoaderMessage::Ready { generation }
                    }
                    Err(err) => {
                        warn!(generation, %err, "scenario fetch failed");
                        let message = err.to_string();
                        *state = LoaderState::Failed {
                            generation,
                            error: Arc::new(err),
                        };
                        LoaderMessage::Failed {
                            generation,
                            message,
                        }
                    }
                }
            }
        };
        self.settled.notify_all();
        if let Some(tx) = &self.notify {
            let _ = tx.send(message);
        }
    }
}

/// Background loader holding the latest published metric set.
pub struct ScenarioDataLoader {
    shared: Arc<Shared>,
}

impl ScenarioDataLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self::build(config, None)
    }

    /// Loader that also reports every completion on the returned channel.
    pub fn with_notifications(config: LoaderConfig) -> (Self, Receiver<LoaderMessage>) {
        let (tx, rx) = mpsc::channel();
        (Self::build(config, Some(tx)), rx)
    }

    fn build(config: LoaderConfig, notify: Option<Sender<LoaderMessage>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                generation: AtomicU64::new(0),
                state: Mutex::new(LoaderState::Idle),
                settled: Condvar::new(),
                notify,
            }),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.shared.config
    }

    pub fn state(&self) -> LoaderState {
        self.shared.lock_state().clone()
    }

    pub fn current_generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Start loading `request`, superseding any fetch still in flight.
    pub fn request(&self, request: ScenarioRequest) -> FetchTicket {
        let generation = {
            let mut state = self.shared.lock_state();
            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = LoaderState::Loading {
                generation,
                request,
            };
            generation
        };
        self.shared.settled.notify_all();
        info!(generation, scenario = %request.scenario, "scenario fetch started");

        let shared = Arc::clone(&self.shared);
        thread::spawn(move || shared.run_fetch(generation, request));
        FetchTicket { generation }
    }

    /// Block until the ticket's fetch has settled or a newer request replaced it.
    pub fn wait(&self, ticket: FetchTicket) -> LoaderState {
        let mut state = self.shared.lock_state();
        loop {
            if settles(&state, ticket) {
                return state.clone();
            }
            state = self
                .shared
                .settled
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`ScenarioDataLoader::wait`], giving up after `timeout`.
    pub fn wait_timeout(&self, ticket: FetchTicket, timeout: Duration) -> Option<LoaderState> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock_state();
        loop {
            if settles(&state, ticket) {
                return Some(state.clone());
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            state = self
                .shared
                .settled
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

fn settles(state: &LoaderState, ticket: FetchTicket) -> bool {
    match state {
        LoaderState::Idle => false,
        LoaderState::Loading { generation, .. } => *generation > ticket.generation,
        LoaderState::Ready { generation, .. } | LoaderState::Failed { generation, .. } => {
            *generation >= ticket.generation
        }
    }
}
