//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
    Panic = 5,
}

/// Every level, from least to most severe
pub const ALL_LEVELS: [LogLevel; 6] = [
    LogLevel::Debug,
    LogLevel::Info,
    LogLevel::Warn,
    LogLevel::Error,
    LogLevel::Fatal,
    LogLevel::Panic,
];

impl LogLevel {
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Panic => "PANIC",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
            LogLevel::Panic => Magenta,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            "PANIC" => Ok(LogLevel::Panic),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// A set of log levels stored as a bit mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelSet(u8);

impl LevelSet {
    pub const EMPTY: LevelSet = LevelSet(0);

    /// Every level at or above `floor`, i.e. the suffix of [`ALL_LEVELS`]
    /// starting at `floor`
    pub fn at_or_above(floor: LogLevel) -> Self {
        let start = ALL_LEVELS
            .iter()
            .position(|level| *level == floor)
            .unwrap_or(ALL_LEVELS.len());
        Self::from_levels(&ALL_LEVELS[start..])
    }

    pub fn only(level: LogLevel) -> Self {
        LevelSet(level.bit())
    }

    pub fn from_levels(levels: &[LogLevel]) -> Self {
        LevelSet(levels.iter().fold(0, |mask, level| mask | level.bit()))
    }

    #[inline]
    pub fn contains(&self, level: LogLevel) -> bool {
        self.0 & level.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Levels in the set, least severe first
    pub fn iter(&self) -> impl Iterator<Item = LogLevel> + '_ {
        ALL_LEVELS.into_iter().filter(move |level| self.contains(*level))
    }
}

impl FromIterator<LogLevel> for LevelSet {
    fn from_iter<I: IntoIterator<Item = LogLevel>>(iter: I) -> Self {
        LevelSet(iter.into_iter().fold(0, |mask, level| mask | level.bit()))
    }
}
