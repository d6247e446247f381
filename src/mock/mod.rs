//! Mock telemetry and recommendation generators.
//!
//! Every generator is a pure function of its inputs and a random source.
//! The `*_with_rng` variants take the random source explicitly so tests can
//! seed it; the plain variants use the thread-local generator.

/// Monthly yield/emission series and metric comparisons.
pub mod analysis;
/// Feed and additive recommendation generator.
pub mod feed;
/// Live methane monitor series.
pub mod methane;

pub use analysis::{MetricComparison, MetricKind, MonthlyPoint, MonthlyTrend};
pub use feed::{FeedRecommendation, HealthStatus};
pub use methane::{MethaneLevel, MethaneReading};

use rand::Rng;

/// Uniform sample in `[min, max)` rounded to `decimals` places.
///
/// A degenerate range returns `min`.
pub fn random_in_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, decimals: u32) -> f64 {
    if max <= min {
        return round_to(min, decimals);
    }
    round_to(rng.random_range(min..max), decimals)
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_in_range_bounds_and_rounding() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = random_in_range(&mut rng, -1.5, 1.5, 1);
            assert!((-1.5..=1.5).contains(&v));
            assert_eq!(round_to(v, 1), v);
        }
    }

    #[test]
    fn test_random_in_range_degenerate() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_in_range(&mut rng, 3.0, 3.0, 0), 3.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(12.5, 0), 13.0);
    }
}
