use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-question countdown setting
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerConfig {
    /// No auto-advance
    Off,
    Seconds(u32),
}

impl TimerConfig {
    /// Choices offered by the host, in cycling order
    pub const PRESETS: [TimerConfig; 3] = [
        TimerConfig::Off,
        TimerConfig::Seconds(15),
        TimerConfig::Seconds(30),
    ];

    pub fn from_secs(secs: u32) -> Self {
        match secs {
            0 => TimerConfig::Off,
            s => TimerConfig::Seconds(s),
        }
    }

    /// Countdown length; 0 when off
    pub fn seconds(&self) -> u32 {
        match self {
            TimerConfig::Off => 0,
            TimerConfig::Seconds(s) => *s,
        }
    }

    pub fn is_off(&self) -> bool {
        self.seconds() == 0
    }

    /// `Seconds(0)` is treated as off
    pub fn normalized(self) -> Self {
        Self::from_secs(self.seconds())
    }

    /// Next preset after this one; custom durations restart at the first preset
    pub fn next(&self) -> Self {
        let idx = Self::PRESETS
            .iter()
            .position(|p| p == &self.normalized())
            .map(|i| (i + 1) % Self::PRESETS.len())
            .unwrap_or(0);
        Self::PRESETS[idx]
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig::Seconds(30)
    }
}

impl fmt::Display for TimerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.seconds() {
            0 => write!(f, "off"),
            s => write!(f, "{s}s"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timer '{0}': expected 'off' or a number of seconds like '15' or '30s'")]
pub struct ParseTimerError(String);

impl FromStr for TimerConfig {
    type Err = ParseTimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        if trimmed == "off" || trimmed == "none" {
            return Ok(TimerConfig::Off);
        }
        trimmed
            .strip_suffix('s')
            .unwrap_or(&trimmed)
            .parse::<u32>()
            .map(TimerConfig::from_secs)
            .map_err(|_| ParseTimerError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_seconds_is_off() {
        assert_eq!(TimerConfig::from_secs(0), TimerConfig::Off);
        assert_eq!(TimerConfig::Seconds(0).normalized(), TimerConfig::Off);
        assert!(TimerConfig::Seconds(0).is_off());
    }

    #[test]
    fn presets_cycle() {
        assert_eq!(TimerConfig::Off.next(), TimerConfig::Seconds(15));
        assert_eq!(TimerConfig::Seconds(15).next(), TimerConfig::Seconds(30));
        assert_eq!(TimerConfig::Seconds(30).next(), TimerConfig::Off);
        assert_eq!(TimerConfig::Seconds(45).next(), TimerConfig::Off);
    }

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!("off".parse::<TimerConfig>(), Ok(TimerConfig::Off));
        assert_eq!("15".parse::<TimerConfig>(), Ok(TimerConfig::Seconds(15)));
        assert_eq!("30s".parse::<TimerConfig>(), Ok(TimerConfig::Seconds(30)));
        assert_eq!("0".parse::<TimerConfig>(), Ok(TimerConfig::Off));
        assert!("soon".parse::<TimerConfig>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for preset in TimerConfig::PRESETS {
            assert_eq!(preset.to_string().parse::<TimerConfig>(), Ok(preset));
        }
    }
}
