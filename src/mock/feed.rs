use super::{random_in_range, round_to};
use crate::herd::Cow;
use crate::types::AppError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Lowest and highest milk yield (L/day) the generator will ever report.
pub const MIN_MILK_YIELD: f64 = 9.0;
pub const MAX_MILK_YIELD: f64 = 40.0;

/// Number of days in the recommendation time series.
pub const SERIES_DAYS: u32 = 5;

/// Health label chosen by the farmer before asking for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum HealthStatus {
    Healthy,
    Injured,
    #[serde(rename = "Chronically Sick")]
    ChronicallySick,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 3] = [
        HealthStatus::Healthy,
        HealthStatus::Injured,
        HealthStatus::ChronicallySick,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Injured => "Injured",
            HealthStatus::ChronicallySick => "Chronically Sick",
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            HealthStatus::Healthy => 1.0,
            HealthStatus::Injured => 0.85,
            HealthStatus::ChronicallySick => 0.7,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HealthStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "healthy" => Ok(HealthStatus::Healthy),
            "injured" => Ok(HealthStatus::Injured),
            "chronically sick" => Ok(HealthStatus::ChronicallySick),
            _ => Err(AppError::InvalidInput(format!(
                "Unknown health status '{}'. Expected one of: Healthy, Injured, Chronically Sick",
                s
            ))),
        }
    }
}

/// One entry of a fixed feed or additive catalog.
struct CatalogItem {
    name: &'static str,
    base_amount: f64,
    nutritional_info: &'static str,
}

const FEED_TYPES: [CatalogItem; 3] = [
    CatalogItem {
        name: "Grass Silage",
        base_amount: 15.0,
        nutritional_info: "High in fiber and protein. Contains essential vitamins and minerals.",
    },
    CatalogItem {
        name: "Corn Silage",
        base_amount: 12.0,
        nutritional_info: "Energy-dense feed with good digestibility. Rich in starch.",
    },
    CatalogItem {
        name: "Mixed Hay",
        base_amount: 10.0,
        nutritional_info: "Balanced fiber content. Good source of roughage.",
    },
];

const ADDITIVE_TYPES: [CatalogItem; 3] = [
    CatalogItem {
        name: "Probiotics",
        base_amount: 50.0,
        nutritional_info: "Supports digestive health and immune function. May improve feed efficiency.",
    },
    CatalogItem {
        name: "Essential Oils",
        base_amount: 30.0,
        nutritional_info: "Natural antimicrobial properties. Can enhance feed palatability.",
    },
    CatalogItem {
        name: "Yeast Culture",
        base_amount: 45.0,
        nutritional_info: "Improves rumen function and fiber digestion. Stabilizes pH levels.",
    },
];

/// Names of the feed types a recommendation can pick from.
pub fn feed_type_names() -> Vec<&'static str> {
    FEED_TYPES.iter().map(|f| f.name).collect()
}

/// Names of the additives a recommendation can pick from.
pub fn additive_names() -> Vec<&'static str> {
    ADDITIVE_TYPES.iter().map(|a| a.name).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedSuggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub nutritional_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YieldEmissionPoint {
    pub day: u32,
    pub milk_yield: f64,
    pub methane_emission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedRecommendation {
    pub dry_matter_intake: FeedSuggestion,
    pub feed_additive: FeedSuggestion,
    pub milk_yield_methane_data: Vec<YieldEmissionPoint>,
    pub summary: String,
    pub predicted_milk_yield: f64,
    pub predicted_methane_emission: f64,
}

fn clamp_yield(value: f64) -> f64 {
    value.clamp(MIN_MILK_YIELD, MAX_MILK_YIELD)
}

pub fn generate_feed_recommendation(cow: &Cow, health: HealthStatus) -> FeedRecommendation {
    generate_feed_recommendation_with_rng(&mut rand::rng(), cow, health)
}

pub fn generate_feed_recommendation_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    cow: &Cow,
    health: HealthStatus,
) -> FeedRecommendation {
    let health_multiplier = health.multiplier();
    let lactation_multiplier = cow.lactation_stage.yield_multiplier();

    let feed = &FEED_TYPES[rng.random_range(0..FEED_TYPES.len())];
    let additive = &ADDITIVE_TYPES[rng.random_range(0..ADDITIVE_TYPES.len())];

    let base_milk_yield = clamp_yield(
        random_in_range(rng, 20.0, 30.0, 1) * health_multiplier * lactation_multiplier,
    );

    // Roughly 300 g of methane per 1000 kg of body weight, scaled by health
    let base_methane = cow.weight * 0.3 * health_multiplier;

    let milk_yield_methane_data = (1..=SERIES_DAYS)
        .map(|day| {
            let day_variation = random_in_range(rng, -1.5, 1.5, 1);
            YieldEmissionPoint {
                day,
                milk_yield: round_to(clamp_yield(base_milk_yield + day_variation), 1),
                methane_emission: round_to(base_methane + random_in_range(rng, -20.0, 20.0, 0), 1),
            }
        })
        .collect();

    let predicted_milk_yield =
        round_to(clamp_yield(base_milk_yield + random_in_range(rng, 0.0, 2.0, 1)), 1);
    let predicted_methane_emission =
        round_to(base_methane - random_in_range(rng, 5.0, 15.0, 0), 1);

    let feed_amount = format!("{:.1}", cow.weight * 0.03 * health_multiplier);
    let additive_amount = random_in_range(
        rng,
        additive.base_amount - 10.0,
        additive.base_amount + 10.0,
        0,
    );

    let outlook = if health == HealthStatus::Healthy {
        "maintain the current"
    } else {
        "improve the"
    };
    let monitoring = if health == HealthStatus::Healthy {
        ""
    } else {
        "Regular monitoring is advised."
    };
    let summary = format!(
        "Based on {}'s {} status and {} lactation stage, we recommend {} at {}kg/day \
         supplemented with {}. This combination should {} milk yield while reducing \
         methane emissions. {}",
        cow.name,
        health.label().to_lowercase(),
        cow.lactation_stage,
        feed.name,
        feed_amount,
        additive.name,
        outlook,
        monitoring
    );

    FeedRecommendation {
        dry_matter_intake: FeedSuggestion {
            kind: feed.name.to_string(),
            amount: format!("{} kg", feed_amount),
            nutritional_info: feed.nutritional_info.to_string(),
        },
        feed_additive: FeedSuggestion {
            kind: additive.name.to_string(),
            amount: format!("{} g", additive_amount as i64),
            nutritional_info: additive.nutritional_info.to_string(),
        },
        milk_yield_methane_data,
        summary,
        predicted_milk_yield,
        predicted_methane_emission,
    }
}
