use chrono::{ DateTime, Duration, Utc };

/// Re-notification is suppressed until strictly more than this much time
/// has passed since the last notification.
const COOLDOWN_HOURS: i64 = 24;

/// Outcome of judging one alert against the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    /// Triggered and outside the cooldown window.
    Fire,
    /// Triggered, but a notification went out within the last 24h.
    SuppressRecent,
    /// Current price is still above the effective target.
    NotTriggered,
}

/// The price threshold an alert is judged against: the explicit target
/// when set, else the cached prediction, else the prediction computed
/// this cycle. The fallback is always available, so an alert without an
/// explicit target still evaluates.
pub fn effective_target(
    target_price: Option<f64>,
    predicted_price: Option<f64>,
    fresh_prediction: f64
) -> f64 {
    target_price.or(predicted_price).unwrap_or(fresh_prediction)
}

/// Decide whether an alert fires. Pure: the caller supplies the clock.
pub fn evaluate(
    current_price: f64,
    effective_target: f64,
    notified_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>
) -> AlertDecision {
    if current_price > effective_target {
        return AlertDecision::NotTriggered;
    }

    match notified_at {
        // Exactly 24h ago still counts as within the window.
        Some(last) if now - last <= Duration::hours(COOLDOWN_HOURS) => {
            AlertDecision::SuppressRecent
        }
        _ => AlertDecision::Fire,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_above_target_never_triggers() {
        let now = Utc::now();
        for notified_at in [None, Some(now - Duration::hours(1)), Some(now - Duration::days(30))] {
            assert_eq!(evaluate(90.0, 85.0, notified_at, now), AlertDecision::NotTriggered);
        }
    }

    #[test]
    fn test_triggered_without_prior_notification_fires() {
        let now = Utc::now();
        assert_eq!(evaluate(80.0, 85.0, None, now), AlertDecision::Fire);
    }

    #[test]
    fn test_price_equal_to_target_triggers() {
        let now = Utc::now();
        assert_eq!(evaluate(85.0, 85.0, None, now), AlertDecision::Fire);
    }

    #[test]
    fn test_recent_notification_suppresses() {
        let now = Utc::now();
        let notified = Some(now - Duration::hours(23));
        assert_eq!(evaluate(80.0, 85.0, notified, now), AlertDecision::SuppressRecent);
    }

    #[test]
    fn test_stale_notification_fires_again() {
        let now = Utc::now();
        let notified = Some(now - Duration::hours(25));
        assert_eq!(evaluate(80.0, 85.0, notified, now), AlertDecision::Fire);
    }

    #[test]
    fn test_cooldown_boundary_is_inclusive() {
        let now = Utc::now();
        let notified = Some(now - Duration::hours(24));
        assert_eq!(evaluate(80.0, 85.0, notified, now), AlertDecision::SuppressRecent);
    }

    #[test]
    fn test_effective_target_precedence() {
        assert_eq!(effective_target(Some(85.0), Some(70.0), 60.0), 85.0);
        assert_eq!(effective_target(None, Some(70.0), 60.0), 70.0);
        assert_eq!(effective_target(None, None, 60.0), 60.0);
    }
}
