//! Engine settings loaded from the environment
//!
//! Defaults reproduce the classic mystery draw: a 3 second reveal that
//! reshuffles the shown score every 100 ms, minimum score 125.
//!
//! Supported environment variables:
//! - BOWLDRAW_TICK_INTERVAL_MS: Resample interval (range: 10-1000)
//! - BOWLDRAW_DRAW_DURATION_MS: Total reveal time (range: 100-60000, >= tick interval)
//! - BOWLDRAW_LEAGUE_NAME: Initial league name
//! - BOWLDRAW_MIN_SCORE: Initial minimum score (range: 0-300)
//! - BOWLDRAW_DARK_MODE: Start in dark mode (true/false)
//!
//! Invalid values are logged and ignored.

use std::time::Duration;

use bowldraw_domain::{DrawConfig, LeagueName, MinScore, Theme};

const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
const DEFAULT_DRAW_DURATION_MS: u64 = 3_000;

const TICK_INTERVAL_RANGE_MS: (u64, u64) = (10, 1_000);
const DRAW_DURATION_RANGE_MS: (u64, u64) = (100, 60_000);

/// Timing of the animated reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawTiming {
    /// Time between two resamples of the shown score
    pub tick_interval: Duration,
    /// Total time from starting a draw to its final value
    pub duration: Duration,
}

impl Default for DrawTiming {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            duration: Duration::from_millis(DEFAULT_DRAW_DURATION_MS),
        }
    }
}

impl DrawTiming {
    pub fn from_millis(tick_interval_ms: u64, duration_ms: u64) -> Self {
        Self {
            tick_interval: Duration::from_millis(tick_interval_ms),
            duration: Duration::from_millis(duration_ms),
        }
    }

    /// Number of samples a draw takes; the last one becomes the final value.
    ///
    /// Rounds down, so the effective reveal lasts `count * tick_interval`,
    /// which is shorter than `duration` when it is not a multiple of the tick.
    /// Time from starting a draw to its final value
    pub fn effective_duration(&self) -> Duration {
        self.tick_interval.max(Duration::from_millis(1)) * self.resample_count()
    }

    pub fn resample_count(&self) -> u32 {
        let tick = self.tick_interval.as_millis().max(1);
        let count = self.duration.as_millis() / tick;
        u32::try_from(count).unwrap_or(u32::MAX).max(1)
    }
}

/// Everything the engine reads from its environment
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub timing: DrawTiming,
    pub league_name: LeagueName,
    pub min_score: MinScore,
    pub theme: Theme,
}

impl EngineSettings {
    /// Defaults with environment variable overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value source.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let tick_ms = read_ranged(&lookup, "BOWLDRAW_TICK_INTERVAL_MS", TICK_INTERVAL_RANGE_MS);
        let duration_ms = read_ranged(&lookup, "BOWLDRAW_DRAW_DURATION_MS", DRAW_DURATION_RANGE_MS);

        let timing = DrawTiming {
            tick_interval: tick_ms
                .map(Duration::from_millis)
                .unwrap_or(self.timing.tick_interval),
            duration: duration_ms
                .map(Duration::from_millis)
                .unwrap_or(self.timing.duration),
        };
        if timing.duration < timing.tick_interval {
            tracing::warn!(
                tick_interval_ms = timing.tick_interval.as_millis() as u64,
                duration_ms = timing.duration.as_millis() as u64,
                "Draw duration shorter than tick interval, keeping previous timing"
            );
        } else {
            if timing.effective_duration() != timing.duration {
                tracing::warn!(
                    tick_interval_ms = timing.tick_interval.as_millis() as u64,
                    duration_ms = timing.duration.as_millis() as u64,
                    effective_ms = timing.effective_duration().as_millis() as u64,
                    "Draw duration is not a multiple of the tick interval, reveal will be shorter"
                );
            }
            self.timing = timing;
        }

        if let Some(val) = lookup("BOWLDRAW_LEAGUE_NAME") {
            match LeagueName::new(val) {
                Ok(name) => {
                    tracing::info!(league = %name, "Applied BOWLDRAW_LEAGUE_NAME environment variable");
                    self.league_name = name;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "BOWLDRAW_LEAGUE_NAME is invalid, ignoring");
                }
            }
        }

        if let Some(val) = lookup("BOWLDRAW_MIN_SCORE") {
            match MinScore::parse(&val) {
                Ok(min) => {
                    tracing::info!(min_score = %min, "Applied BOWLDRAW_MIN_SCORE environment variable");
                    self.min_score = min;
                }
                Err(e) => {
                    tracing::warn!(val = %val, error = %e, "BOWLDRAW_MIN_SCORE is invalid, ignoring");
                }
            }
        }

        if let Some(val) = lookup("BOWLDRAW_DARK_MODE") {
            match val.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.theme = Theme::Dark,
                "0" | "false" | "no" | "off" => self.theme = Theme::Light,
                _ => tracing::warn!(val = %val, "BOWLDRAW_DARK_MODE is not a boolean, ignoring"),
            }
        }

        self
    }

    /// Configuration the setup screen starts from
    pub fn initial_config(&self) -> DrawConfig {
        DrawConfig::new(self.league_name.clone(), self.min_score)
    }
}

fn read_ranged(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    (min, max): (u64, u64),
) -> Option<u64> {
    let val = lookup(key)?;
    match val.trim().parse::<u64>() {
        Ok(ms) if (min..=max).contains(&ms) => {
            tracing::info!(key, ms, "Applied timing environment variable");
            Some(ms)
        }
        Ok(ms) => {
            tracing::warn!(key, ms, min, max, "Timing environment variable out of range, ignoring");
            None
        }
        Err(_) => {
            tracing::warn!(key, val = %val, "Timing environment variable is not a valid u64, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings_with(vars: &[(&str, &str)]) -> EngineSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineSettings::default().with_overrides(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_are_thirty_resamples_over_three_seconds() {
        let settings = EngineSettings::default();
        assert_eq!(settings.timing.tick_interval, Duration::from_millis(100));
        assert_eq!(settings.timing.duration, Duration::from_millis(3000));
        assert_eq!(settings.timing.resample_count(), 30);
        assert_eq!(settings.min_score.value(), 125);
        assert_eq!(settings.theme, Theme::Light);
    }

    #[test]
    fn valid_overrides_apply() {
        let settings = settings_with(&[
            ("BOWLDRAW_TICK_INTERVAL_MS", "50"),
            ("BOWLDRAW_DRAW_DURATION_MS", "1000"),
            ("BOWLDRAW_LEAGUE_NAME", "Thursday Seniors"),
            ("BOWLDRAW_MIN_SCORE", "160"),
            ("BOWLDRAW_DARK_MODE", "true"),
        ]);
        assert_eq!(settings.timing.resample_count(), 20);
        assert_eq!(settings.league_name.as_str(), "Thursday Seniors");
        assert_eq!(settings.min_score.value(), 160);
        assert_eq!(settings.theme, Theme::Dark);

        let config = settings.initial_config();
        assert_eq!(config.min_score().value(), 160);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let settings = settings_with(&[
            ("BOWLDRAW_TICK_INTERVAL_MS", "5"),
            ("BOWLDRAW_DRAW_DURATION_MS", "soon"),
            ("BOWLDRAW_LEAGUE_NAME", "   "),
            ("BOWLDRAW_MIN_SCORE", "301"),
            ("BOWLDRAW_DARK_MODE", "maybe"),
        ]);
        assert_eq!(settings.timing, DrawTiming::default());
        assert_eq!(settings.league_name.as_str(), "Mystery Game Drawing");
        assert_eq!(settings.min_score.value(), 125);
        assert_eq!(settings.theme, Theme::Light);
    }

    #[test]
    fn duration_shorter_than_tick_is_ignored() {
        let settings = settings_with(&[
            ("BOWLDRAW_TICK_INTERVAL_MS", "500"),
            ("BOWLDRAW_DRAW_DURATION_MS", "200"),
        ]);
        assert_eq!(settings.timing, DrawTiming::default());
    }

    #[test]
    fn uneven_duration_rounds_down_to_whole_ticks() {
        let settings = settings_with(&[
            ("BOWLDRAW_TICK_INTERVAL_MS", "300"),
            ("BOWLDRAW_DRAW_DURATION_MS", "1000"),
        ]);
        assert_eq!(settings.timing.resample_count(), 3);
        assert_eq!(settings.timing.effective_duration(), Duration::from_millis(900));
        assert_eq!(
            DrawTiming::default().effective_duration(),
            Duration::from_millis(3000)
        );
    }

    #[test]
    fn resample_count_is_at_least_one() {
        assert_eq!(DrawTiming::from_millis(1000, 100).resample_count(), 1);
        assert_eq!(DrawTiming::from_millis(0, 100).resample_count(), 100);
    }
}
