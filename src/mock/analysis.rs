use super::round_to;
use crate::herd::Cow;
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MONTH_DAYS: u32 = 30;

/// Day index (counting back from today) at which the simulated decline starts.
const DECLINE_START: u32 = 15;
const BASE_EMISSION: f64 = 400.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub date: NaiveDate,
    pub milk_yield: f64,
    pub methane_emission: f64,
}

/// Thirty days of yield and emission ending at `today`, with a decline in
/// yield (and matching rise in methane) over the last fifteen days.
pub fn generate_monthly_data<R: Rng + ?Sized>(
    rng: &mut R,
    cow: &Cow,
    today: NaiveDate,
) -> Vec<MonthlyPoint> {
    let normal_yield = cow.lactation_stage.normal_milk_yield();

    (0..MONTH_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - chrono::Duration::days(days_ago as i64);
            let decline_factor = if days_ago < DECLINE_START {
                1.0 - (DECLINE_START - days_ago) as f64 * 0.02
            } else {
                1.0
            };
            let milk_noise = 0.95 + rng.random::<f64>() * 0.1;
            let methane_noise = 0.95 + rng.random::<f64>() * 0.1;
            let emission_increase = (1.0 - decline_factor) * 100.0;

            MonthlyPoint {
                date,
                milk_yield: round_to(normal_yield * decline_factor * milk_noise, 1),
                methane_emission: round_to(BASE_EMISSION + emission_increase * methane_noise, 1),
            }
        })
        .collect()
}

/// Change between the first and last day of a monthly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// Percent change of milk yield, negative when yield dropped
    pub milk_yield_change_pct: f64,
    /// Percent change of methane emission
    pub methane_change_pct: f64,
    pub below_expected_range: bool,
}

impl MonthlyTrend {
    pub fn from_series(cow: &Cow, series: &[MonthlyPoint]) -> Option<Self> {
        let first = series.first()?;
        let last = series.last()?;
        if first.milk_yield == 0.0 || first.methane_emission == 0.0 {
            return None;
        }
        Some(Self {
            milk_yield_change_pct: round_to((last.milk_yield / first.milk_yield - 1.0) * 100.0, 1),
            methane_change_pct: round_to(
                (last.methane_emission / first.methane_emission - 1.0) * 100.0,
                1,
            ),
            below_expected_range: cow.milk_yield < cow.lactation_stage.low_yield_threshold(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Milk,
    Methane,
}

/// Traffic-light band of a metric relative to its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MetricBand {
    Good,
    Watch,
    Poor,
}

/// Current versus predicted value of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub kind: MetricKind,
    pub unit: String,
    pub current_value: f64,
    pub predicted_value: f64,
    /// Absolute percentage change, one decimal
    pub change_pct: f64,
    pub is_improvement: bool,
    pub predicted_band: MetricBand,
}

impl MetricComparison {
    pub fn new(kind: MetricKind, current_value: f64, predicted_value: f64) -> Self {
        let change_pct = if current_value == 0.0 {
            0.0
        } else {
            round_to(((predicted_value - current_value) / current_value * 100.0).abs(), 1)
        };
        // Lower is better for methane, higher is better for milk
        let is_improvement = match kind {
            MetricKind::Methane => predicted_value < current_value,
            MetricKind::Milk => predicted_value > current_value,
        };
        let unit = match kind {
            MetricKind::Milk => "L/day",
            MetricKind::Methane => "g/day",
        };

        Self {
            kind,
            unit: unit.to_string(),
            current_value,
            predicted_value,
            change_pct,
            is_improvement,
            predicted_band: band(kind, predicted_value),
        }
    }
}

fn band(kind: MetricKind, value: f64) -> MetricBand {
    let (low, high) = match kind {
        MetricKind::Milk => (15.0, 30.0),
        MetricKind::Methane => (100.0, 150.0),
    };
    match kind {
        MetricKind::Methane if value < low => MetricBand::Good,
        MetricKind::Methane if value > high => MetricBand::Poor,
        MetricKind::Milk if value < low => MetricBand::Poor,
        MetricKind::Milk if value > high => MetricBand::Good,
        _ => MetricBand::Watch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::herd::find_cow;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
    }

    #[test]
    fn test_monthly_series_covers_thirty_days_ending_today() {
        let cow = find_cow(1).unwrap();
        let series = generate_monthly_data(&mut StdRng::seed_from_u64(1), &cow, today());
        assert_eq!(series.len(), 30);
        assert_eq!(series.last().unwrap().date, today());
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    }

    #[test]
    fn test_monthly_series_declines_at_the_end() {
        let cow = find_cow(2).unwrap();
        let series = generate_monthly_data(&mut StdRng::seed_from_u64(4), &cow, today());
        // Early stage normal yield is 35 L; the last day is scaled by 0.7
        let last = series.last().unwrap();
        assert!(last.milk_yield <= 35.0 * 0.7 * 1.05 + 0.05);
        assert!(last.methane_emission >= 400.0 + 30.0 * 0.95 - 0.05);

        let first = &series[0];
        assert!(first.milk_yield >= 35.0 * 0.95 - 0.05);
        assert!(first.methane_emission == 400.0);

        let trend = MonthlyTrend::from_series(&cow, &series).unwrap();
        assert!(trend.milk_yield_change_pct < 0.0);
        assert!(trend.methane_change_pct > 0.0);
    }

    #[test]
    fn test_metric_comparison_direction() {
        let milk = MetricComparison::new(MetricKind::Milk, 20.0, 22.0);
        assert!(milk.is_improvement);
        assert_eq!(milk.change_pct, 10.0);
        assert_eq!(milk.predicted_band, MetricBand::Watch);

        let methane = MetricComparison::new(MetricKind::Methane, 100.0, 90.0);
        assert!(methane.is_improvement);
        assert_eq!(methane.change_pct, 10.0);
        assert_eq!(methane.predicted_band, MetricBand::Good);

        let worse = MetricComparison::new(MetricKind::Methane, 100.0, 160.0);
        assert!(!worse.is_improvement);
        assert_eq!(worse.predicted_band, MetricBand::Poor);
    }

    #[test]
    fn test_metric_comparison_zero_current() {
        let cmp = MetricComparison::new(MetricKind::Milk, 0.0, 10.0);
        assert_eq!(cmp.change_pct, 0.0);
    }
}
