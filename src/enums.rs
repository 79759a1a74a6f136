use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Trend ──────────────────────────────────────────────────────────

/// Coarse direction of a product's recent price movement, derived from
/// comparing short- and long-window moving averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Declining,
    Stable,
    Rising,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Declining => "declining",
            Trend::Stable => "stable",
            Trend::Rising => "rising",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── CheckStatus ────────────────────────────────────────────────────

/// Per-product / per-alert outcome recorded in a cycle report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// The price could not be fetched from the source page.
    Failed,
    /// An alert fired and a notification was dispatched.
    AlertSent,
    /// An alert triggered but is still inside its cooldown window.
    AlertRecentlyNotified,
    /// Price recorded, the alert did not trigger.
    Checked,
    /// Price recorded, the product has no active alerts.
    CheckedNoAlerts,
    /// An unexpected per-product error; the cycle continued.
    Error,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Failed => "failed",
            CheckStatus::AlertSent => "alert_sent",
            CheckStatus::AlertRecentlyNotified => "alert_recently_notified",
            CheckStatus::Checked => "checked",
            CheckStatus::CheckedNoAlerts => "checked_no_alerts",
            CheckStatus::Error => "error",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
