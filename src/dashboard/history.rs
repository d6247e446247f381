use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlanItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
}

/// A feed plan issued for one cow on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalFeedPlan {
    pub cow_name: String,
    pub date: String,
    pub dry_matter_intake: PlanItem,
    pub feed_additive: PlanItem,
    pub milk_yield: f64,
    pub methane_emission: f64,
    pub health_status: String,
    pub summary: String,
}

#[allow(clippy::too_many_arguments)]
fn plan(
    cow_name: &str,
    date: &str,
    feed: (&str, &str),
    additive: (&str, &str),
    milk_yield: f64,
    methane_emission: f64,
    health_status: &str,
    summary: &str,
) -> HistoricalFeedPlan {
    HistoricalFeedPlan {
        cow_name: cow_name.to_string(),
        date: date.to_string(),
        dry_matter_intake: PlanItem {
            kind: feed.0.to_string(),
            amount: feed.1.to_string(),
        },
        feed_additive: PlanItem {
            kind: additive.0.to_string(),
            amount: additive.1.to_string(),
        },
        milk_yield,
        methane_emission,
        health_status: health_status.to_string(),
        summary: summary.to_string(),
    }
}

pub fn feed_plans() -> Vec<HistoricalFeedPlan> {
    vec![
        plan(
            "Bessie",
            "2023-06-01",
            ("Grass Silage", "15 kg"),
            ("Probiotics", "50 g"),
            25.0,
            400.0,
            "Healthy",
            "Bessie is doing well. Maintain current feed plan with slight increase in probiotics.",
        ),
        plan(
            "Bessie",
            "2023-06-02",
            ("Corn Silage", "14 kg"),
            ("Enzymes", "30 g"),
            26.0,
            390.0,
            "Healthy",
            "Bessie's milk yield has improved. Continue with the current plan.",
        ),
        plan(
            "Daisy",
            "2023-06-01",
            ("Alfalfa Hay", "13 kg"),
            ("Yeast Culture", "40 g"),
            22.0,
            420.0,
            "Injured",
            "Daisy is recovering from a minor injury. Adjusted feed plan to support recovery.",
        ),
        plan(
            "Molly",
            "2023-06-03",
            ("Mixed Ration", "16 kg"),
            ("Mineral Blend", "60 g"),
            28.0,
            380.0,
            "Healthy",
            "Molly is performing exceptionally well. Maintain current feed plan.",
        ),
    ]
}

pub fn find_feed_plan(cow_name: &str, date: &str) -> Option<HistoricalFeedPlan> {
    feed_plans()
        .into_iter()
        .find(|p| p.cow_name == cow_name && p.date == date)
}
