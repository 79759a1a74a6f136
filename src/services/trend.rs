use crate::enums::Trend;

/// Minimum observations before the moving-average comparison is
/// meaningful; below this the series is treated as stable.
const MIN_OBSERVATIONS: usize = 3;

const SHORT_WINDOW: usize = 3;
const LONG_WINDOW: usize = 5;

/// A trend classification plus the price considered a good buy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub trend: Trend,
    pub target_price: f64,
}

/// Average of the last `window` prices, or of the whole series when it
/// is shorter than the window.
fn moving_average(prices: &[f64], window: usize) -> f64 {
    if prices.len() < window {
        return prices.iter().sum::<f64>() / (prices.len() as f64);
    }
    let recent = &prices[prices.len() - window..];
    recent.iter().sum::<f64>() / (window as f64)
}

/// Classify the direction of the series by comparing a short moving
/// average against a longer one.
pub fn detect_trend(prices: &[f64]) -> Trend {
    if prices.len() < MIN_OBSERVATIONS {
        return Trend::Stable;
    }

    let tail_start = prices.len().saturating_sub(LONG_WINDOW);
    let short = moving_average(&prices[tail_start..], SHORT_WINDOW);
    let long = moving_average(prices, LONG_WINDOW);

    if short < long * 0.95 {
        Trend::Declining
    } else if short > long * 1.05 {
        Trend::Rising
    } else {
        Trend::Stable
    }
}

/// Compute the trend and a predicted "good time to buy" price for an
/// ordered (oldest to newest) series. Deterministic and side-effect
/// free: the same inputs always produce the same prediction. This is a
/// simple heuristic, not a statistical forecast.
pub fn analyze(prices: &[f64], current_price: f64) -> Prediction {
    if prices.len() < MIN_OBSERVATIONS {
        // Cold start: aim 10% below whatever the price is now.
        return Prediction {
            trend: Trend::Stable,
            target_price: current_price * 0.9,
        };
    }

    let min_price = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let mean_price = prices.iter().sum::<f64>() / (prices.len() as f64);
    let trend = detect_trend(prices);

    let target_price = match trend {
        Trend::Declining => (current_price * 0.95).min((min_price + mean_price) / 2.0),
        Trend::Rising => min_price * 1.05,
        Trend::Stable => (min_price + mean_price) / 2.0,
    };

    Prediction { trend, target_price }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_series_is_stable_cold_start() {
        for prices in [vec![], vec![50.0], vec![50.0, 48.0]] {
            let prediction = analyze(&prices, 40.0);
            assert_eq!(prediction.trend, Trend::Stable);
            assert!((prediction.target_price - 36.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let prices = vec![100.0, 95.0, 90.0, 85.0, 80.0, 82.0, 81.0];
        let first = analyze(&prices, 79.5);
        for _ in 0..10 {
            assert_eq!(analyze(&prices, 79.5), first);
        }
    }

    #[test]
    fn test_declining_series() {
        // Short avg (last 3) = 85, long avg (last 5) = 90; 85 < 0.95 * 90
        let prices = vec![100.0, 95.0, 90.0, 85.0, 80.0];
        let prediction = analyze(&prices, 78.0);

        assert_eq!(prediction.trend, Trend::Declining);
        // min(78 * 0.95, (80 + 90) / 2) = min(74.1, 85) = 74.1
        assert!((prediction.target_price - 74.1).abs() < 1e-9);
    }

    #[test]
    fn test_rising_series() {
        let prices = vec![80.0, 85.0, 90.0, 100.0, 110.0];
        // Short avg = 100, long avg = 93; 100 > 1.05 * 93 = 97.65
        let prediction = analyze(&prices, 112.0);

        assert_eq!(prediction.trend, Trend::Rising);
        // min * 1.05 = 80 * 1.05 = 84
        assert!((prediction.target_price - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_stable_series_predicts_midpoint() {
        let prices = vec![100.0, 101.0, 99.0, 100.0, 100.0];
        let prediction = analyze(&prices, 100.0);

        assert_eq!(prediction.trend, Trend::Stable);
        // midpoint between series min (99) and mean (100)
        assert!((prediction.target_price - 99.5).abs() < 1e-9);
    }

    #[test]
    fn test_windows_clamp_to_available_data() {
        // 4 points: long window falls back to averaging all of them
        let prices = vec![100.0, 90.0, 60.0, 50.0];
        // short avg (last 3) = 66.67, long avg (all 4) = 75
        assert_eq!(detect_trend(&prices), Trend::Declining);
    }

    #[test]
    fn test_moving_average_full_and_partial() {
        let prices = vec![10.0, 20.0, 30.0, 40.0];
        assert!((moving_average(&prices, 2) - 35.0).abs() < 1e-9);
        assert!((moving_average(&prices, 10) - 25.0).abs() < 1e-9);
    }
}
