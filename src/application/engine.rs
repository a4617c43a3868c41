// Diagnostic engine - Owns the live state and drives the update cycle
// All mutable state sits behind one async mutex, held by a tick from the
// threshold snapshot to the last write-through.
use crate::application::alert::AlertSink;
use crate::application::history_store::DiagnosticHistoryStore;
use crate::application::persistence::Persistence;
use crate::application::series::RollingSeries;
use crate::application::simulator::ReadingSource;
use crate::application::threshold_settings::ThresholdSettings;
use crate::application::warning_log::{WarningLog, WarningTally};
use crate::domain::prediction::{BatteryPrediction, predict_battery_life};
use crate::domain::reading::{BatteryUsage, DataPoint, Reading, SeriesChannel};
use crate::domain::record::DiagnosticRecord;
use crate::domain::status::StatusSummary;
use crate::domain::thresholds::{ThresholdConfig, ThresholdField};
use crate::domain::warning::{Warning, WarningKind};
use crate::error::ThresholdError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, broadcast, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Change notifications for observers of the engine.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum EngineEvent {
    Connected,
    Disconnected,
    Reading(Reading),
    Warning(Warning),
    ThresholdsChanged(ThresholdConfig),
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Connected => "connected",
            EngineEvent::Disconnected => "disconnected",
            EngineEvent::Reading(_) => "reading",
            EngineEvent::Warning(_) => "warning",
            EngineEvent::ThresholdsChanged(_) => "thresholdsChanged",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub reading: Reading,
    pub warning: Option<Warning>,
}

struct EngineState {
    connection: ConnectionState,
    current: Option<Reading>,
    series: RollingSeries,
    warnings: WarningLog,
    history: DiagnosticHistoryStore,
    source: Box<dyn ReadingSource>,
    stop_ticker: Option<oneshot::Sender<()>>,
}

struct Shared {
    state: Mutex<EngineState>,
    thresholds: ThresholdSettings,
    alerts: Arc<dyn AlertSink>,
    events: broadcast::Sender<EngineEvent>,
    tick_interval: Duration,
}

#[derive(Clone)]
pub struct DiagnosticEngine {
    shared: Arc<Shared>,
}

impl DiagnosticEngine {
    /// Build an engine in the `Disconnected` state, restoring thresholds,
    /// the warning log and the history from `persistence`. Restore failures
    /// are logged and leave the affected collection empty.
    pub async fn load(
        persistence: Arc<dyn Persistence>,
        source: Box<dyn ReadingSource>,
        alerts: Arc<dyn AlertSink>,
        tick_interval: Duration,
    ) -> Self {
        let thresholds = ThresholdSettings::load(persistence.clone()).await;

        let mut warnings = WarningLog::new(persistence.clone());
        match warnings.restore().await {
            Ok(0) => {}
            Ok(dropped) => tracing::warn!("Dropped {} malformed warning log entries", dropped),
            Err(e) => tracing::warn!("Starting with an empty warning log: {}", e),
        }

        let mut history = DiagnosticHistoryStore::new(persistence);
        match history.restore().await {
            Ok(0) => {}
            Ok(dropped) => tracing::warn!("Dropped {} malformed history records", dropped),
            Err(e) => tracing::warn!("Starting with an empty history: {}", e),
        }

        tracing::info!(
            "Engine loaded: {} warnings, {} history records",
            warnings.len(),
            history.len()
        );

        let state = EngineState {
            connection: ConnectionState::Disconnected,
            current: None,
            series: RollingSeries::new(),
            warnings,
            history,
            source,
            stop_ticker: None,
        };
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                thresholds,
                alerts,
                events,
                tick_interval,
            }),
        }
    }

    /// `Disconnected -> Connected`; starts the periodic cycle. Returns
    /// whether the state changed.
    pub async fn connect(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        if state.connection == ConnectionState::Connected {
            return false;
        }

        state.connection = ConnectionState::Connected;
        let (stop, stop_rx) = oneshot::channel();
        tokio::spawn(run_ticker(
            Arc::downgrade(&self.shared),
            self.shared.tick_interval,
            stop_rx,
        ));
        state.stop_ticker = Some(stop);

        tracing::info!("Connected; ticking every {:?}", self.shared.tick_interval);
        let _ = self.shared.events.send(EngineEvent::Connected);
        true
    }

    /// `Connected -> Disconnected`; no reading is produced after this returns.
    /// A tick already in progress finishes normally.
    pub async fn disconnect(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        if state.connection == ConnectionState::Disconnected {
            return false;
        }

        state.connection = ConnectionState::Disconnected;
        if let Some(stop) = state.stop_ticker.take() {
            let _ = stop.send(());
        }

        tracing::info!("Disconnected");
        let _ = self.shared.events.send(EngineEvent::Disconnected);
        true
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.shared.state.lock().await.connection
    }

    /// Run one update cycle. Does nothing and returns `None` unless connected.
    pub async fn tick(&self) -> Option<TickOutcome> {
        let mut state = self.shared.state.lock().await;
        if state.connection != ConnectionState::Connected {
            return None;
        }

        let config = self.shared.thresholds.snapshot();
        let reading = state.source.next_reading();
        state.current = Some(reading.clone());
        state.series.push(&reading);

        let record = state.history.append(&reading).await;
        if let Err(e) = &record.persisted {
            tracing::warn!("History write-through failed: {}", e);
        }

        let warning = match state.warnings.record_if_breached(&reading, &config).await {
            Some(appended) => {
                if let Err(e) = &appended.persisted {
                    tracing::warn!("Warning log write-through failed: {}", e);
                }
                Some(appended.item)
            }
            None => None,
        };

        let _ = self.shared.events.send(EngineEvent::Reading(reading.clone()));
        if let Some(warning) = &warning {
            self.shared.alerts.notify(&warning.message);
            let _ = self.shared.events.send(EngineEvent::Warning(warning.clone()));
        }

        tracing::debug!(
            "Tick: engine {:.1}°C, battery {:.1}%, warning: {}",
            reading.engine_temperature,
            reading.battery_level,
            warning.is_some()
        );

        Some(TickOutcome { reading, warning })
    }

    pub async fn current_reading(&self) -> Option<Reading> {
        self.shared.state.lock().await.current.clone()
    }

    pub async fn rolling_series(&self, channel: SeriesChannel) -> Vec<DataPoint> {
        self.shared.state.lock().await.series.series(channel)
    }

    pub async fn battery_usage(&self) -> Vec<BatteryUsage> {
        self.shared.state.lock().await.series.battery_usage()
    }

    pub async fn warning_log(&self) -> Vec<Warning> {
        self.shared.state.lock().await.warnings.snapshot()
    }

    pub async fn warning_tallies(&self) -> BTreeMap<WarningKind, WarningTally> {
        self.shared.state.lock().await.warnings.tallies()
    }

    pub async fn counter_for(&self, kind: WarningKind) -> u64 {
        self.shared.state.lock().await.warnings.counter_for(kind)
    }

    pub async fn history(&self) -> Vec<DiagnosticRecord> {
        self.shared.state.lock().await.history.all()
    }

    pub async fn battery_prediction(&self) -> BatteryPrediction {
        let state = self.shared.state.lock().await;
        let usage = state.series.battery_usage();
        let current_level = state
            .current
            .as_ref()
            .map(|reading| reading.battery_level)
            .or_else(|| usage.last().map(|sample| sample.battery_level))
            .unwrap_or(0.0);
        predict_battery_life(&usage, current_level)
    }

    /// Classification of the current reading against the current thresholds.
    pub async fn status_summary(&self) -> Option<StatusSummary> {
        let config = self.shared.thresholds.snapshot();
        let state = self.shared.state.lock().await;
        state
            .current
            .as_ref()
            .map(|reading| StatusSummary::of(reading, &config))
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        self.shared.thresholds.snapshot()
    }

    pub async fn set_threshold(&self, field: ThresholdField, value: f64) -> Result<ThresholdConfig, ThresholdError> {
        let result = self.shared.thresholds.set(field, value).await;
        let applied = match &result {
            Ok(config) => Some(*config),
            // Applied, just not saved.
            Err(ThresholdError::Store(_)) => Some(self.shared.thresholds.snapshot()),
            Err(_) => None,
        };
        if let Some(config) = applied {
            let _ = self.shared.events.send(EngineEvent::ThresholdsChanged(config));
        }
        result
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.shared.events.subscribe()
    }
}

async fn run_ticker(shared: Weak<Shared>, period: Duration, mut stop: oneshot::Receiver<()>) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = interval.tick() => {}
        }

        let Some(shared) = shared.upgrade() else {
            break;
        };
        DiagnosticEngine { shared }.tick().await;
    }

    tracing::debug!("Ticker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::alert::testing::RecordingSink;
    use crate::application::persistence::testing::FailingStore;
    use crate::application::persistence::{DIAGNOSTIC_HISTORY_KEY, WARNING_LOGS_KEY};
    use crate::application::series::{BATTERY_USAGE_CAPACITY, SERIES_CAPACITY};
    use crate::domain::reading::nominal_reading;
    use crate::infrastructure::memory_store::MemoryStore;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + ChronoDuration::seconds(seconds)
    }

    /// Nominal readings one second apart, with engine overheat on every
    /// `overheat_every`-th tick (never if 0).
    fn scripted(overheat_every: i64) -> Box<dyn ReadingSource> {
        let mut n = 0;
        Box::new(move || {
            let mut reading = nominal_reading(at(n));
            if overheat_every > 0 && n % overheat_every == 0 {
                reading.engine_temperature = 130.0;
            }
            n += 1;
            reading
        })
    }

    async fn engine_with(
        persistence: Arc<dyn Persistence>,
        source: Box<dyn ReadingSource>,
    ) -> (DiagnosticEngine, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let engine = DiagnosticEngine::load(persistence, source, sink.clone(), DEFAULT_TICK_INTERVAL).await;
        (engine, sink)
    }

    #[tokio::test]
    async fn test_tick_requires_connection() {
        let (engine, _) = engine_with(Arc::new(MemoryStore::new()), scripted(0)).await;
        assert_eq!(engine.connection_state().await, ConnectionState::Disconnected);
        assert!(engine.tick().await.is_none());
        assert!(engine.current_reading().await.is_none());
        assert!(engine.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_tick_routes_reading_everywhere() {
        let store = Arc::new(MemoryStore::new());
        let (engine, sink) = engine_with(store.clone(), scripted(1)).await;
        assert!(engine.connect().await);

        let outcome = engine.tick().await.unwrap();
        let warning = outcome.warning.expect("overheat should warn");
        assert_eq!(warning.kind, "Multiple Warnings");
        assert_eq!(engine.current_reading().await, Some(outcome.reading.clone()));
        assert_eq!(engine.rolling_series(SeriesChannel::EngineTemperature).await.len(), 1);
        assert_eq!(engine.battery_usage().await.len(), 1);
        assert_eq!(engine.history().await[0].reading, outcome.reading);
        assert_eq!(engine.warning_log().await, vec![warning.clone()]);
        assert_eq!(engine.counter_for(WarningKind::EngineTemperature).await, 1);
        assert_eq!(sink.messages(), vec![warning.message]);
        assert!(store.contains(WARNING_LOGS_KEY).await);
        assert!(store.contains(DIAGNOSTIC_HISTORY_KEY).await);
        engine.disconnect().await;
    }

    #[tokio::test]
    async fn test_clean_tick_does_not_alert() {
        let (engine, sink) = engine_with(Arc::new(MemoryStore::new()), scripted(0)).await;
        engine.connect().await;

        let outcome = engine.tick().await.unwrap();
        assert!(outcome.warning.is_none());
        assert!(engine.warning_log().await.is_empty());
        assert!(sink.messages().is_empty());
        assert_eq!(engine.history().await.len(), 1);
        engine.disconnect().await;
    }

    #[tokio::test]
    async fn test_bounded_collections_under_many_ticks() {
        let (engine, _) = engine_with(Arc::new(MemoryStore::new()), scripted(2)).await;
        engine.connect().await;
        for _ in 0..130 {
            engine.tick().await;
        }
        engine.disconnect().await;

        for channel in SeriesChannel::ALL {
            assert_eq!(engine.rolling_series(channel).await.len(), SERIES_CAPACITY);
        }
        assert_eq!(engine.battery_usage().await.len(), BATTERY_USAGE_CAPACITY);
        assert_eq!(engine.history().await.len(), 10);
        assert_eq!(engine.warning_log().await.len(), 50);
        assert_eq!(engine.counter_for(WarningKind::EngineTemperature).await, 65);

        let history = engine.history().await;
        assert_eq!(history.last().unwrap().reading.timestamp, at(129));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_stops_ticking() {
        let (engine, _) = engine_with(Arc::new(MemoryStore::new()), scripted(0)).await;
        let mut events = engine.subscribe();

        engine.connect().await;
        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(engine.history().await.len(), 3);

        engine.disconnect().await;
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.history().await.len(), 3);
        assert_eq!(engine.rolling_series(SeriesChannel::BatteryLevel).await.len(), 3);

        engine.connect().await;
        time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(engine.history().await.len(), 5);
        engine.disconnect().await;

        let mut names = Vec::new();
        while let Ok(event) = events.try_recv() {
            names.push(event.name());
        }
        assert_eq!(
            names,
            vec![
                "connected",
                "reading",
                "reading",
                "reading",
                "disconnected",
                "connected",
                "reading",
                "reading",
                "disconnected"
            ]
        );
    }

    #[tokio::test]
    async fn test_connect_and_disconnect_are_idempotent() {
        let (engine, _) = engine_with(Arc::new(MemoryStore::new()), scripted(0)).await;
        assert!(!engine.disconnect().await);
        assert!(engine.connect().await);
        assert!(!engine.connect().await);
        assert_eq!(engine.connection_state().await, ConnectionState::Connected);
        assert!(engine.disconnect().await);
        assert!(!engine.disconnect().await);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_ticking() {
        let (engine, sink) = engine_with(Arc::new(FailingStore), scripted(1)).await;
        engine.connect().await;
        for _ in 0..3 {
            assert!(engine.tick().await.is_some());
        }
        engine.disconnect().await;

        assert_eq!(engine.history().await.len(), 3);
        assert_eq!(engine.warning_log().await.len(), 3);
        assert_eq!(sink.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let store = Arc::new(MemoryStore::new());
        let (engine, _) = engine_with(store.clone(), scripted(3)).await;
        engine.connect().await;
        for _ in 0..6 {
            engine.tick().await;
        }
        engine.disconnect().await;
        engine
            .set_threshold(ThresholdField::EngineTempHigh, 125.0)
            .await
            .unwrap();

        let (reloaded, _) = engine_with(store, scripted(0)).await;
        assert_eq!(reloaded.history().await, engine.history().await);
        assert_eq!(reloaded.warning_log().await, engine.warning_log().await);
        assert_eq!(reloaded.thresholds().engine_temp_high, 125.0);
        // Counters belong to the engine instance.
        assert_eq!(reloaded.counter_for(WarningKind::EngineTemperature).await, 0);
    }

    #[tokio::test]
    async fn test_threshold_edit_applies_to_next_tick() {
        let (engine, _) = engine_with(Arc::new(MemoryStore::new()), scripted(0)).await;
        let mut events = engine.subscribe();
        engine.connect().await;

        assert!(engine.tick().await.unwrap().warning.is_none());
        engine
            .set_threshold(ThresholdField::EngineTempModerate, 80.0)
            .await
            .unwrap();
        engine
            .set_threshold(ThresholdField::EngineTempHigh, 85.0)
            .await
            .unwrap();
        let outcome = engine.tick().await.unwrap();
        assert_eq!(
            outcome.warning.unwrap().message,
            "Warning: Engine temperature is above 85°C!"
        );
        engine.disconnect().await;

        assert!(engine
            .set_threshold(ThresholdField::TireLow, 40.0)
            .await
            .is_err());

        let mut threshold_events = 0;
        while let Ok(event) = events.try_recv() {
            if let EngineEvent::ThresholdsChanged(_) = event {
                threshold_events += 1;
            }
        }
        assert_eq!(threshold_events, 2);
    }

    #[tokio::test]
    async fn test_concurrent_edits_each_publish_their_own_config() {
        let (engine, _) = engine_with(Arc::new(MemoryStore::new()), scripted(0)).await;
        let mut events = engine.subscribe();

        let (first, second) = tokio::join!(
            engine.set_threshold(ThresholdField::TireHigh, 36.0),
            engine.set_threshold(ThresholdField::BatteryLow, 25.0),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        let mut published = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let EngineEvent::ThresholdsChanged(config) = event {
                published.push(config);
            }
        }
        assert_eq!(published.len(), 2);
        assert_ne!(published[0], published[1]);
        assert!(published.contains(&first));
        assert!(published.contains(&second));
        assert_eq!(engine.thresholds().tire_high, 36.0);
        assert_eq!(engine.thresholds().battery_low, 25.0);
    }

    #[tokio::test]
    async fn test_battery_prediction_from_ticks() {
        let mut n = 0;
        let source = Box::new(move || {
            let mut reading = nominal_reading(at(n * 1_800));
            reading.battery_level = 80.0 - 10.0 * n as f64;
            n += 1;
            reading
        });
        let (engine, _) = engine_with(Arc::new(MemoryStore::new()), source).await;
        assert_eq!(
            engine.battery_prediction().await,
            BatteryPrediction::InsufficientData
        );

        engine.connect().await;
        engine.tick().await;
        engine.tick().await;
        engine.disconnect().await;

        // 80% -> 70% over half an hour is 20%/h; 70 / 20 = 3.5h.
        assert_eq!(
            engine.battery_prediction().await.to_string(),
            "Estimated battery life: 3.5 hours"
        );
    }

    #[tokio::test]
    async fn test_status_summary_tracks_current_reading() {
        let (engine, _) = engine_with(Arc::new(MemoryStore::new()), scripted(1)).await;
        assert!(engine.status_summary().await.is_none());

        engine.connect().await;
        engine.tick().await;
        engine.disconnect().await;

        let summary = engine.status_summary().await.unwrap();
        assert_eq!(summary.overall, crate::domain::status::OverallStatus::Warning);
    }
}
