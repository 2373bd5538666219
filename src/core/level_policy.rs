//! Level policy: which entries are delivered, and which of them notify
//!
//! Eligibility and urgency are independent. Eligibility decides whether an
//! entry reaches the transport at all; urgency decides whether the chat
//! message is sent with notifications enabled.

use super::log_level::{LevelSet, LogLevel};

/// Level used when no threshold is configured
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Warn;

/// How delivered messages notify chat members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notification {
    /// Every delivered message notifies
    #[default]
    Always,
    /// No delivered message notifies
    Suppressed,
    /// Notifications are suppressed except for the listed levels.
    /// An empty set never notifies.
    OnLevels(LevelSet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelPolicy {
    eligible: LevelSet,
    notification: Notification,
}

impl LevelPolicy {
    /// Eligible for every level at or above `floor`
    pub fn threshold(floor: LogLevel) -> Self {
        Self {
            eligible: LevelSet::at_or_above(floor),
            notification: Notification::default(),
        }
    }

    /// Eligible for exactly one level
    pub fn exact(level: LogLevel) -> Self {
        Self {
            eligible: LevelSet::only(level),
            notification: Notification::default(),
        }
    }

    /// Replace the eligible set with the levels at or above `floor`
    pub fn set_threshold(&mut self, floor: LogLevel) {
        self.eligible = LevelSet::at_or_above(floor);
    }

    /// Replace the eligible set with `level` alone
    pub fn set_exact(&mut self, level: LogLevel) {
        self.eligible = LevelSet::only(level);
    }

    pub fn set_notification(&mut self, notification: Notification) {
        self.notification = notification;
    }

    #[must_use]
    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = notification;
        self
    }

    #[inline]
    pub fn eligible(&self, level: LogLevel) -> bool {
        self.eligible.contains(level)
    }

    #[inline]
    pub fn urgent(&self, level: LogLevel) -> bool {
        match self.notification {
            Notification::Always => true,
            Notification::Suppressed => false,
            Notification::OnLevels(levels) => levels.contains(level),
        }
    }

    pub fn eligible_levels(&self) -> LevelSet {
        self.eligible
    }

    pub fn notification(&self) -> Notification {
        self.notification
    }
}

impl Default for LevelPolicy {
    fn default() -> Self {
        Self::threshold(DEFAULT_LEVEL)
    }
}
