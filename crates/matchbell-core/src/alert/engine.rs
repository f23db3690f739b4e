//! The alert scheduling engine.
//!
//! Owns the active-competition table and the configuration. Reported
//! competitions are checked for eligibility and, when they qualify, get a
//! deferred alert armed ahead of their start. Configuration changes
//! revoke and re-arm every pending alert; started competitions are pruned
//! on demand.
//!
//! Entry points lock the shared state and never hold the lock across an
//! await, so alert hooks (which run on their own tasks) can safely call
//! back into the engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::alert::timing::{plan, AlertTiming};
use crate::clock::{StartTime, SyncedClock};
use crate::config::{AlertConfig, AlertConfigPatch};
use crate::error::{ClockError, Result};
use crate::host::{
    AlertPresenter, AlertView, ClickHook, DeferredAlert, Module, PrepareHook, ResourceResolver,
    ViewHost,
};
use crate::storage::SettingsStore;

/// A competition as reported by the upstream feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competition {
    pub id: u64,
    pub priority: u32,
    /// `None` means no longer relevant (started or cancelled).
    #[serde(default)]
    pub start: Option<StartTime>,
}

/// Collaborators the engine needs from its host.
#[derive(Clone)]
pub struct HostServices {
    pub settings: Arc<dyn SettingsStore>,
    pub presenter: Arc<dyn AlertPresenter>,
    pub views: Arc<dyn ViewHost>,
    pub resources: Arc<dyn ResourceResolver>,
}

struct Record {
    priority: u32,
    start: Option<StartTime>,
    /// Live alert handle; present only while an alert is scheduled or
    /// displayed for this competition.
    armed: Option<DeferredAlert>,
}

struct EngineState {
    config: AlertConfig,
    clock: SyncedClock,
    table: HashMap<u64, Record>,
}

/// Deferred-alert scheduling engine. See the module docs.
pub struct AlertEngine {
    state: Arc<Mutex<EngineState>>,
    host: HostServices,
}

impl AlertEngine {
    /// Engine with the system clock. Configuration comes from the settings
    /// store, falling back to defaults on first run.
    pub fn new(host: HostServices) -> Result<Self> {
        Self::with_clock(host, SyncedClock::new())
    }

    /// Engine with a caller-supplied clock (tests pin the time source).
    pub fn with_clock(host: HostServices, clock: SyncedClock) -> Result<Self> {
        let config = host.settings.load()?.unwrap_or_default();
        Ok(Self {
            state: Arc::new(Mutex::new(EngineState {
                config,
                clock,
                table: HashMap::new(),
            })),
            host,
        })
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Set the clock correction: server minus local, in milliseconds.
    /// Must happen before anything start-time related.
    pub fn set_clock_correction(&self, offset_ms: i64) {
        self.state.lock().unwrap().clock.set_correction(offset_ms);
    }

    pub fn clock_correction(&self) -> Option<i64> {
        self.state.lock().unwrap().clock.correction()
    }

    /// Seconds until `start` on the corrected clock, clamped at zero.
    pub fn remaining_secs(&self, start: &StartTime) -> Result<u64, ClockError> {
        self.state.lock().unwrap().clock.remaining_secs(start)
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Snapshot of the current configuration.
    pub fn params(&self) -> AlertConfig {
        self.state.lock().unwrap().config.clone()
    }

    /// Merge a partial update, persist it, and re-arm every pending alert
    /// under the new parameters.
    pub fn set_params(&self, patch: &AlertConfigPatch) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let mut next = state.config.clone();
        next.apply(patch);
        // Persist before committing so a failed save leaves nothing changed.
        self.host.settings.store(&next)?;
        state.config = next;
        self.reconcile(&mut state)
    }

    // ── Competitions ─────────────────────────────────────────────────

    /// Insert or replace a competition and arm an alert if it qualifies.
    ///
    /// Re-reporting an id replaces the prior record, revoking any alert it
    /// owned first.
    pub fn report(&self, competition: Competition) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let planned = match &competition.start {
            Some(start) => {
                let remaining = state.clock.remaining_secs(start)?;
                plan(&state.config, competition.priority, remaining).map(|timing| (remaining, timing))
            }
            None => None,
        };

        if let Some(old) = state.table.remove(&competition.id) {
            if let Some(alert) = old.armed {
                alert.revoke();
            }
        }

        let armed = planned.map(|(remaining, timing)| {
            self.arm(competition.id, competition.priority, remaining, timing)
        });

        state.table.insert(
            competition.id,
            Record {
                priority: competition.priority,
                start: competition.start,
                armed,
            },
        );
        Ok(())
    }

    /// Drop every competition whose start instant has passed.
    ///
    /// Does not revoke: a started competition's alert has already fired or
    /// is on screen. Returns how many records were removed.
    pub fn prune_started(&self) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.table.values().any(|record| record.start.is_some()) {
            state.clock.ensure_synced()?;
        }

        let mut started = Vec::new();
        for (id, record) in &state.table {
            if let Some(start) = &record.start {
                if state.clock.remaining_secs(start)? == 0 {
                    started.push(*id);
                }
            }
        }
        for id in &started {
            state.table.remove(id);
        }

        if !started.is_empty() {
            debug!(removed = started.len(), "pruned started competitions");
        }
        Ok(started.len())
    }

    /// Revoke every armed alert and drop every record.
    pub fn clear_all(&self) {
        let mut state = self.state.lock().unwrap();
        let removed = state.table.len();
        for (_, record) in state.table.drain() {
            if let Some(alert) = record.armed {
                alert.revoke();
            }
        }
        if removed > 0 {
            debug!(removed, "cleared active competitions");
        }
    }

    // ── Observability ────────────────────────────────────────────────

    /// Ids of every tracked competition, sorted.
    pub fn tracked_ids(&self) -> Vec<u64> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<u64> = state.table.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of competitions that currently own an alert handle, sorted.
    pub fn armed_ids(&self) -> Vec<u64> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<u64> = state
            .table
            .iter()
            .filter(|(_, record)| record.armed.is_some())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Handle of the alert armed for `id`, if any. Handles are cheap
    /// clones; hosts use them to deliver clicks back to the engine.
    pub fn armed_alert(&self, id: u64) -> Option<DeferredAlert> {
        let state = self.state.lock().unwrap();
        state.table.get(&id).and_then(|record| record.armed.clone())
    }

    /// Whether any alert still has a display ahead of it.
    pub fn has_live_alerts(&self) -> bool {
        let state = self.state.lock().unwrap();
        state
            .table
            .values()
            .any(|record| record.armed.as_ref().is_some_and(DeferredAlert::is_live))
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Revoke-then-re-arm every record with a concrete start under the
    /// current configuration. Runs over the whole table before returning.
    fn reconcile(&self, state: &mut EngineState) -> Result<()> {
        // Fail before touching any record if the clock cannot answer.
        if state.table.values().any(|record| record.start.is_some()) {
            state.clock.ensure_synced()?;
        }

        let ids: Vec<u64> = state.table.keys().copied().collect();
        let mut armed_count = 0usize;
        for id in ids {
            let Some(record) = state.table.get_mut(&id) else {
                continue;
            };
            if let Some(alert) = record.armed.take() {
                alert.revoke();
            }
            let Some(start) = record.start.clone() else {
                continue;
            };
            let priority = record.priority;

            let remaining = state.clock.remaining_secs(&start)?;
            if let Some(timing) = plan(&state.config, priority, remaining) {
                let alert = self.arm(id, priority, remaining, timing);
                if let Some(record) = state.table.get_mut(&id) {
                    record.armed = Some(alert);
                    armed_count += 1;
                }
            }
        }

        info!(
            tracked = state.table.len(),
            armed = armed_count,
            "reconciled alerts"
        );
        Ok(())
    }

    /// Build and schedule the deferred alert for one competition.
    fn arm(&self, id: u64, priority: u32, remaining_secs: u64, timing: AlertTiming) -> DeferredAlert {
        let page = self.host.resources.resolve(&format!("competition/{id}"));
        let icon = self.host.resources.resolve("icons/bell.png");
        let sound = self.host.resources.resolve("sounds/bell.ogg");

        let notice = timing.notice_secs(remaining_secs);
        let view = AlertView {
            title: "Competition starting soon".to_string(),
            body: format!(
                "A priority {priority} competition starts in {}. Click to open it.",
                notice_text(notice)
            ),
            icon,
            sound,
            display_secs: timing.display_secs,
            play_audio: false,
        };

        // Audio decision, taken right before display: current config, and
        // mute when the user is already viewing the competition page.
        let prepare: PrepareHook = {
            let state = Arc::downgrade(&self.state);
            let views = Arc::clone(&self.host.views);
            let page = page.clone();
            Box::new(move || {
                let state = Weak::clone(&state);
                let views = Arc::clone(&views);
                let page = page.clone();
                Box::pin(async move {
                    let audio_enabled = state
                        .upgrade()
                        .map(|state| state.lock().unwrap().config.audio_enabled)
                        .unwrap_or(false);
                    if !audio_enabled {
                        return false;
                    }
                    match views.open_views().await {
                        Ok(open) => !open.iter().any(|view| view.points_at(&page)),
                        Err(error) => {
                            warn!(error = %error, "view enumeration failed; muting alert");
                            false
                        }
                    }
                })
            })
        };

        // Clicking opens the competition page and retires the alert.
        let onclick: ClickHook = {
            let state = Arc::downgrade(&self.state);
            let views = Arc::clone(&self.host.views);
            Box::new(move || {
                views.open_view(&page);
                if let Some(state) = state.upgrade() {
                    let mut state = state.lock().unwrap();
                    if let Some(record) = state.table.get_mut(&id) {
                        if let Some(alert) = record.armed.take() {
                            alert.revoke();
                        }
                    }
                }
            })
        };

        let alert = DeferredAlert::new(view, Arc::clone(&self.host.presenter), prepare, onclick);
        debug!(
            id,
            priority,
            delay_secs = timing.show_delay_secs,
            "arming deferred alert"
        );
        alert.show(Duration::from_secs(timing.show_delay_secs));
        alert
    }
}

impl Module for AlertEngine {
    fn name(&self) -> &str {
        "competition-alerts"
    }

    fn teardown(&self) {
        info!("alert engine teardown");
        self.clear_all();
    }
}

fn notice_text(secs: u64) -> String {
    if secs >= 60 {
        format!("{} min", secs.div_ceil(60))
    } else {
        format!("{secs} s")
    }
}
