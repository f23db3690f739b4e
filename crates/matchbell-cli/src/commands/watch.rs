use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use matchbell_core::host::{BoxFuture, HostError};
use matchbell_core::{
    AlertEngine, AlertPresenter, AlertView, BaseUrlResolver, Competition, HostServices, Module,
    TomlSettings, ViewDescriptor, ViewHost,
};
use tracing::{info, warn};
use url::Url;

#[derive(Args)]
pub struct WatchArgs {
    /// Roster file: JSON array of competitions
    pub roster: PathBuf,
    /// Clock correction in milliseconds (server minus local)
    #[arg(long, default_value_t = 0)]
    pub offset_ms: i64,
    /// Base URL competition pages and assets resolve against
    #[arg(long, default_value = "https://arena.example/")]
    pub base_url: Url,
}

struct TerminalPresenter;

impl AlertPresenter for TerminalPresenter {
    fn present(&self, view: &AlertView) {
        // \x07 rings the terminal bell when the audio decision allows it.
        let bell = if view.play_audio { "\x07" } else { "" };
        println!("{bell}>> {}", view.title);
        println!("   {}", view.body);
    }
}

/// The CLI keeps no window inventory, so nothing is ever "already open";
/// clicking hands the page to the system browser.
struct DesktopViews;

impl ViewHost for DesktopViews {
    fn open_views(&self) -> BoxFuture<Result<Vec<ViewDescriptor>, HostError>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn open_view(&self, url: &str) {
        if let Err(err) = open::that(url) {
            warn!(error = %err, url, "failed to open browser");
        }
    }
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let roster: Vec<Competition> = serde_json::from_str(&std::fs::read_to_string(&args.roster)?)?;

    let host = HostServices {
        settings: Arc::new(TomlSettings::default_location()?),
        presenter: Arc::new(TerminalPresenter),
        views: Arc::new(DesktopViews),
        resources: Arc::new(BaseUrlResolver::new(args.base_url.clone())),
    };
    let engine = AlertEngine::new(host)?;
    engine.set_clock_correction(args.offset_ms);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        for competition in roster {
            engine.report(competition)?;
        }
        info!(
            tracked = engine.tracked_ids().len(),
            armed = engine.armed_ids().len(),
            "watching roster"
        );

        while engine.has_live_alerts() {
            tokio::time::sleep(Duration::from_secs(1)).await;
            engine.prune_started()?;
        }
        Ok::<_, Box<dyn std::error::Error>>(())
    })?;

    engine.teardown();
    Ok(())
}
