//! Deferred alert primitive: armed now, displayed later.
//!
//! Display is two-phase. After the show delay elapses, the prepare hook
//! runs (async, resolves the audio decision), then the view is presented.
//! `revoke` cancels the pending timer, an in-flight prepare, and a
//! prepare that already resolved but has not presented yet -- a revoked
//! alert can never surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::host::{AlertPresenter, AlertView, BoxFuture};

/// Hook that runs right before display and resolves to "play audio".
pub type PrepareHook = Box<dyn Fn() -> BoxFuture<bool> + Send + Sync>;

/// Hook fired when the user interacts with the displayed alert.
pub type ClickHook = Box<dyn Fn() + Send + Sync>;

/// An alert scheduled for a later instant.
///
/// Handles are cheap to clone; all clones control the same alert.
#[derive(Clone)]
pub struct DeferredAlert {
    inner: Arc<AlertTask>,
}

struct AlertTask {
    view: AlertView,
    presenter: Arc<dyn AlertPresenter>,
    prepare: PrepareHook,
    onclick: ClickHook,
    revoked: AtomicBool,
    /// Serializes present against revoke: whichever takes the gate first
    /// wins the race, so a revoke landing after prepare resolved still
    /// suppresses the display.
    gate: Mutex<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DeferredAlert {
    pub fn new(
        view: AlertView,
        presenter: Arc<dyn AlertPresenter>,
        prepare: PrepareHook,
        onclick: ClickHook,
    ) -> Self {
        Self {
            inner: Arc::new(AlertTask {
                view,
                presenter,
                prepare,
                onclick,
                revoked: AtomicBool::new(false),
                gate: Mutex::new(()),
                handle: Mutex::new(None),
            }),
        }
    }

    /// Schedule the display `delay` from now.
    ///
    /// Must be called from within a tokio runtime. Calling `show` twice
    /// replaces the pending timer.
    pub fn show(&self, delay: Duration) {
        let task = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if task.revoked.load(Ordering::SeqCst) {
                return;
            }
            let play_audio = (task.prepare)().await;
            let _gate = task.gate.lock().unwrap();
            if task.revoked.load(Ordering::SeqCst) {
                return;
            }
            let view = AlertView {
                play_audio,
                ..task.view.clone()
            };
            task.presenter.present(&view);
        });
        if let Some(previous) = self.inner.handle.lock().unwrap().replace(handle) {
            previous.abort();
        }
    }

    /// Cancel the alert. Idempotent; cancels the pending timer and
    /// suppresses any in-flight display.
    pub fn revoke(&self) {
        {
            let _gate = self.inner.gate.lock().unwrap();
            if self.inner.revoked.swap(true, Ordering::SeqCst) {
                return;
            }
        }
        if let Some(handle) = self.inner.handle.lock().unwrap().take() {
            handle.abort();
        }
        debug!("deferred alert revoked");
    }

    pub fn is_revoked(&self) -> bool {
        self.inner.revoked.load(Ordering::SeqCst)
    }

    /// Whether the alert still has a display ahead of it.
    pub fn is_live(&self) -> bool {
        if self.is_revoked() {
            return false;
        }
        self.inner
            .handle
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Host-side report of a user interaction with the displayed alert.
    pub fn click(&self) {
        if self.is_revoked() {
            return;
        }
        (self.inner.onclick)();
    }
}
