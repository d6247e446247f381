use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Readings kept in a series (two minutes at three-second intervals).
pub const WINDOW: usize = 40;

const MIN_READING: f64 = 30.0;
const MAX_READING: f64 = 97.0;
const MAX_STEP_RATIO: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MethaneReading {
    /// Wall-clock time, `HH:MM:SS`
    pub time: String,
    /// Grams
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MethaneLevel {
    Low,
    Medium,
    High,
}

impl MethaneLevel {
    pub fn classify(value: f64) -> Self {
        if value < 45.0 {
            MethaneLevel::Low
        } else if value < 75.0 {
            MethaneLevel::Medium
        } else {
            MethaneLevel::High
        }
    }

    /// Display color used by dashboards.
    pub fn color(&self) -> &'static str {
        match self {
            MethaneLevel::Low => "#22c55e",
            MethaneLevel::Medium => "#eab308",
            MethaneLevel::High => "#ef4444",
        }
    }
}

/// Appends one reading to `prev` and returns the trailing window.
///
/// The first reading starts mid-range; later ones move at most 5% from the
/// previous value and stay within the sensor range.
pub fn next_methane_series<R: Rng + ?Sized>(
    rng: &mut R,
    prev: &[MethaneReading],
    now: DateTime<Utc>,
) -> Vec<MethaneReading> {
    let value = match prev.last() {
        None => rng.random_range(45.0..60.0_f64).floor(),
        Some(last) => {
            let max_change = last.value * MAX_STEP_RATIO;
            let change = if max_change > 0.0 {
                rng.random_range(-max_change..max_change)
            } else {
                0.0
            };
            (last.value + change).clamp(MIN_READING, MAX_READING)
        }
    };

    let keep_from = prev.len().saturating_sub(WINDOW - 1);
    let mut series = prev[keep_from..].to_vec();
    series.push(MethaneReading {
        time: now.format("%H:%M:%S").to_string(),
        value: value.round(),
    });
    series
}

/// Builds a fresh series of `count` readings spaced `interval_secs` apart,
/// ending at `now`.
pub fn simulate_series<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    interval_secs: i64,
    now: DateTime<Utc>,
) -> Vec<MethaneReading> {
    let mut series = Vec::new();
    for i in (0..count).rev() {
        let at = now - chrono::Duration::seconds(interval_secs * i as i64);
        series = next_methane_series(rng, &series, at);
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_first_reading_starts_mid_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let series = next_methane_series(&mut rng, &[], Utc::now());
            assert_eq!(series.len(), 1);
            assert!((45.0..60.0).contains(&series[0].value));
        }
    }

    #[test]
    fn test_series_steps_are_bounded_and_clamped() {
        let mut rng = StdRng::seed_from_u64(11);
        let series = simulate_series(&mut rng, 200, 3, Utc::now());
        assert_eq!(series.len(), WINDOW);
        for pair in series.windows(2) {
            let (a, b) = (pair[0].value, pair[1].value);
            assert!((MIN_READING..=MAX_READING).contains(&b));
            // 5% step plus rounding slack
            assert!((b - a).abs() <= a * MAX_STEP_RATIO + 1.0);
        }
    }

    #[test]
    fn test_window_is_capped() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut series = Vec::new();
        for _ in 0..WINDOW + 10 {
            series = next_methane_series(&mut rng, &series, Utc::now());
        }
        assert_eq!(series.len(), WINDOW);
    }

    #[test]
    fn test_level_classification() {
        assert_eq!(MethaneLevel::classify(44.9), MethaneLevel::Low);
        assert_eq!(MethaneLevel::classify(45.0), MethaneLevel::Medium);
        assert_eq!(MethaneLevel::classify(74.0), MethaneLevel::Medium);
        assert_eq!(MethaneLevel::classify(75.0), MethaneLevel::High);
        assert_eq!(MethaneLevel::High.color(), "#ef4444");
    }

    #[test]
    fn test_reading_time_format() {
        let now = DateTime::parse_from_rfc3339("2024-04-02T08:05:09Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut rng = StdRng::seed_from_u64(0);
        let series = next_methane_series(&mut rng, &[], now);
        assert_eq!(series[0].time, "08:05:09");
    }
}
