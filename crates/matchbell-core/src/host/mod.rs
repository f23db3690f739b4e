//! Host collaborator seams.
//!
//! The engine does not display anything, enumerate views, or resolve
//! assets itself -- it talks to these traits. Hosts (the CLI, a desktop
//! shell, tests) supply the implementations.

mod deferred;

pub use deferred::{ClickHook, DeferredAlert, PrepareHook};

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use url::Url;

/// Boxed future returned by async host queries.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Error type host implementations report through.
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

/// A view (tab, window, pane) the host currently has open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    /// URL-like locator of what the view is showing.
    pub locator: String,
}

impl ViewDescriptor {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
        }
    }

    /// Whether this view already shows the given page. Trailing slashes,
    /// query strings, and fragments on the locator do not count as a
    /// different page.
    pub fn points_at(&self, url: &str) -> bool {
        let locator = self.locator.trim_end_matches('/');
        let url = url.trim_end_matches('/');
        if locator == url {
            return true;
        }
        locator
            .strip_prefix(url)
            .is_some_and(|rest| rest.starts_with('?') || rest.starts_with('#'))
    }
}

/// Inspection and navigation of the host's open views.
pub trait ViewHost: Send + Sync {
    /// Enumerate currently open views. One-shot request-response.
    fn open_views(&self) -> BoxFuture<Result<Vec<ViewDescriptor>, HostError>>;

    /// Navigate to a page. Fired from alert clicks; fire-and-forget.
    fn open_view(&self, url: &str);
}

/// Thin display primitive. Rendering, styling, and localization happen
/// host-side; the engine only hands over the final view.
pub trait AlertPresenter: Send + Sync {
    fn present(&self, view: &AlertView);
}

/// A fully computed alert, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertView {
    pub title: String,
    pub body: String,
    /// Absolute icon location.
    pub icon: String,
    /// Absolute sound location; played only when `play_audio` is set.
    pub sound: String,
    /// Forced on-screen duration in seconds; `None` leaves the host default.
    pub display_secs: Option<u64>,
    /// Outcome of the pre-display suppression check.
    pub play_audio: bool,
}

/// Resolves crate-relative asset and page paths to absolute URLs.
pub trait ResourceResolver: Send + Sync {
    fn resolve(&self, relative: &str) -> String;
}

/// Resolver that joins relative paths onto a fixed base URL.
pub struct BaseUrlResolver {
    base: Url,
}

impl BaseUrlResolver {
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl ResourceResolver for BaseUrlResolver {
    fn resolve(&self, relative: &str) -> String {
        match self.base.join(relative) {
            Ok(url) => url.to_string(),
            // Unjoinable input falls back to the base itself.
            Err(_) => self.base.to_string(),
        }
    }
}

/// A lifecycle-managed module, as seen by the embedding host.
///
/// Inbound messages default to a no-op; modules override what they handle.
pub trait Module: Send + Sync {
    /// Unique identifier (e.g. "competition-alerts").
    fn name(&self) -> &str;

    /// Inbound host message. Default: ignore.
    fn on_message(&self, _topic: &str, _payload: &serde_json::Value) -> Result<(), HostError> {
        Ok(())
    }

    /// Release every resource the module holds.
    fn teardown(&self);
}
