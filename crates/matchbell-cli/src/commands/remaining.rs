use clap::Args;
use matchbell_core::{StartTime, SyncedClock};

#[derive(Args)]
pub struct RemainingArgs {
    /// Start instant: ISO-8601 timestamp or Unix seconds
    pub start: String,
    /// Clock correction in milliseconds (server minus local)
    #[arg(long, default_value_t = 0)]
    pub offset_ms: i64,
}

pub fn run(args: RemainingArgs) -> Result<(), Box<dyn std::error::Error>> {
    let start = parse_start(&args.start);
    let mut clock = SyncedClock::new();
    clock.set_correction(args.offset_ms);
    let remaining = clock.remaining_secs(&start)?;
    println!("{remaining}");
    Ok(())
}

/// A value that parses as a number is Unix seconds; anything else is
/// handed to the ISO parser.
fn parse_start(raw: &str) -> StartTime {
    match raw.parse::<f64>() {
        Ok(secs) => StartTime::UnixSeconds(secs),
        Err(_) => StartTime::Iso(raw.to_string()),
    }
}
