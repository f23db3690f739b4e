//! Eligibility and timing for a single competition alert.

use crate::config::AlertConfig;

/// Timing of an armed alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertTiming {
    /// Seconds from now until the alert surfaces.
    pub show_delay_secs: u64,
    /// Forced on-screen duration; `None` leaves the host default.
    pub display_secs: Option<u64>,
}

impl AlertTiming {
    /// Seconds between the alert surfacing and the competition starting.
    pub fn notice_secs(&self, remaining_secs: u64) -> u64 {
        remaining_secs.saturating_sub(self.show_delay_secs)
    }
}

/// Decide whether an alert should be armed for a competition `remaining_secs`
/// away, and with what timing.
///
/// Eligibility requires a non-zero lead time, a start still in the future,
/// and a priority the filter accepts. The forced display duration is
/// clamped so the alert never claims to stay visible past the start
/// itself; a clamp down to zero falls back to the host default.
pub fn plan(config: &AlertConfig, priority: u32, remaining_secs: u64) -> Option<AlertTiming> {
    if config.lead_secs == 0 || remaining_secs == 0 {
        return None;
    }
    if !config.priority_filter.contains(&priority) {
        return None;
    }

    let show_delay_secs = remaining_secs.saturating_sub(config.lead_secs);
    // remaining > 0 here, so the visibility window is always > 0.
    let window = remaining_secs - show_delay_secs;
    let display = config.display_secs.min(window);

    Some(AlertTiming {
        show_delay_secs,
        display_secs: (display > 0).then_some(display),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn config(lead_secs: u64, display_secs: u64) -> AlertConfig {
        AlertConfig {
            priority_filter: BTreeSet::from([3, 5]),
            lead_secs,
            display_secs,
            audio_enabled: true,
        }
    }

    #[test]
    fn eligible_event_far_out_uses_default_duration() {
        // leadTime 60, start in 300s, priority 3: surfaces at T-60.
        let timing = plan(&config(60, 0), 3, 300).unwrap();
        assert_eq!(timing.show_delay_secs, 240);
        assert_eq!(timing.display_secs, None);
        assert_eq!(timing.notice_secs(300), 60);
    }

    #[test]
    fn filtered_priority_is_ineligible() {
        assert_eq!(plan(&config(60, 0), 4, 300), None);
    }

    #[test]
    fn start_inside_lead_window_shows_immediately() {
        // leadTime 60 but the start is only 30s away: no delay, and the
        // forced duration is clamped to the 30s left.
        let timing = plan(&config(60, 120), 3, 30).unwrap();
        assert_eq!(timing.show_delay_secs, 0);
        assert_eq!(timing.display_secs, Some(30));
    }

    #[test]
    fn zero_lead_disables_alerting() {
        assert_eq!(plan(&config(0, 0), 3, 300), None);
    }

    #[test]
    fn started_event_is_ineligible() {
        assert_eq!(plan(&config(60, 0), 3, 0), None);
    }

    #[test]
    fn display_duration_is_clamped_to_the_visibility_window() {
        let timing = plan(&config(60, 45), 5, 300).unwrap();
        assert_eq!(timing.display_secs, Some(45));

        let timing = plan(&config(60, 600), 5, 300).unwrap();
        assert_eq!(timing.display_secs, Some(60));
    }

    proptest! {
        #[test]
        fn show_delay_never_exceeds_remaining(
            lead in 1u64..100_000,
            display in 0u64..100_000,
            remaining in 1u64..1_000_000,
        ) {
            if let Some(timing) = plan(&config(lead, display), 3, remaining) {
                prop_assert!(timing.show_delay_secs <= remaining);
                if let Some(display_secs) = timing.display_secs {
                    prop_assert!(display_secs > 0);
                    prop_assert!(timing.show_delay_secs + display_secs <= remaining);
                }
            }
        }

        #[test]
        fn unlisted_priorities_never_plan(
            priority in 6u32..1000,
            lead in 0u64..100_000,
            remaining in 0u64..1_000_000,
        ) {
            prop_assert_eq!(plan(&config(lead, 0), priority, remaining), None);
        }
    }
}
