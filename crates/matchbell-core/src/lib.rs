//! # Matchbell Core Library
//!
//! Core logic for Matchbell, a deferred alert scheduler for upcoming
//! competitions. The CLI binary is a thin command layer over this crate;
//! an embedding host (desktop shell, extension bridge) can drive the same
//! engine through the collaborator traits.
//!
//! ## Architecture
//!
//! - **Alert Engine**: owns the active-competition table and the user
//!   configuration; arms, revokes, and re-arms deferred alerts as
//!   competitions are reported, parameters change, and time passes
//! - **Synced Clock**: local wall clock plus a signed server correction;
//!   every remaining-time computation goes through it
//! - **Storage**: TOML-backed settings store for the four user parameters
//! - **Host seams**: alert display, open-view enumeration, and resource
//!   resolution are traits supplied by the embedding host
//!
//! ## Key Components
//!
//! - [`AlertEngine`]: scheduling engine and public surface
//! - [`SyncedClock`]: corrected remaining-time computation
//! - [`DeferredAlert`]: arm-now-display-later primitive with race-safe
//!   revocation
//! - [`AlertConfig`]: user configuration with partial-update merging

pub mod alert;
pub mod clock;
pub mod config;
pub mod error;
pub mod host;
pub mod storage;

pub use alert::{plan, AlertEngine, AlertTiming, Competition, HostServices};
pub use clock::{StartTime, SyncedClock};
pub use config::{AlertConfig, AlertConfigPatch};
pub use error::{ClockError, ConfigError, CoreError};
pub use host::{
    AlertPresenter, AlertView, BaseUrlResolver, DeferredAlert, Module, ResourceResolver,
    ViewDescriptor, ViewHost,
};
pub use storage::{MemorySettings, SettingsStore, TomlSettings};
