//! Static sample herds.
//!
//! Two views of the same three animals exist:
//!
//! - [`dashboard_cows`] - lactation-stage records used by the dashboard and
//!   the feed recommendation generator.
//! - [`record_herd`] - breed, status and daily records used to build the
//!   AI assistant context.
//!
//! Both are rebuilt on every call; nothing here is ever mutated.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lactation stage of a milking cow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LactationStage {
    Early,
    Mid,
    Late,
}

impl LactationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LactationStage::Early => "early",
            LactationStage::Mid => "mid",
            LactationStage::Late => "late",
        }
    }

    /// Yield multiplier applied by the feed generator.
    pub fn yield_multiplier(&self) -> f64 {
        match self {
            LactationStage::Early => 1.2,
            LactationStage::Mid => 1.0,
            LactationStage::Late => 0.8,
        }
    }

    /// Typical daily milk yield (L) for a healthy cow at this stage.
    pub fn normal_milk_yield(&self) -> f64 {
        match self {
            LactationStage::Early => 35.0,
            LactationStage::Mid => 25.0,
            LactationStage::Late => 18.0,
        }
    }

    /// Yield (L/day) under which the cow is flagged for attention.
    pub fn low_yield_threshold(&self) -> f64 {
        match self {
            LactationStage::Early => 33.5,
            LactationStage::Mid => 20.0,
            LactationStage::Late => 15.0,
        }
    }
}

impl std::fmt::Display for LactationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard view of a cow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cow {
    pub id: u32,
    pub name: String,
    pub age: u32,
    /// Body weight in kg
    pub weight: f64,
    pub lactation_stage: LactationStage,
    /// Liters per day
    pub milk_yield: f64,
    /// Kg per day
    pub feed_intake: f64,
    /// Grams per day
    pub current_methane_emission: f64,
}

impl Cow {
    /// Liters of milk per kg of feed.
    pub fn feed_efficiency(&self) -> f64 {
        if self.feed_intake <= 0.0 {
            return 0.0;
        }
        self.milk_yield / self.feed_intake
    }

    /// High methane output or a yield below the stage threshold.
    pub fn needs_attention(&self) -> bool {
        const HIGH_EMISSION_THRESHOLD: f64 = 100.0;
        self.current_methane_emission > HIGH_EMISSION_THRESHOLD
            || self.milk_yield < self.lactation_stage.low_yield_threshold()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PregnancyStatus {
    Pregnant,
    NotPregnant,
    Unknown,
}

impl PregnancyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PregnancyStatus::Pregnant => "pregnant",
            PregnancyStatus::NotPregnant => "not_pregnant",
            PregnancyStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordHealthStatus {
    Healthy,
    Sick,
    Recovering,
}

impl RecordHealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordHealthStatus::Healthy => "healthy",
            RecordHealthStatus::Sick => "sick",
            RecordHealthStatus::Recovering => "recovering",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub date: String,
    /// Liters
    pub milk_production: f64,
    /// Kg
    pub feed_intake: f64,
    /// Liters
    pub water_intake: f64,
    pub health_notes: String,
    /// Celsius
    pub temperature: f64,
    /// Kg
    pub weight: f64,
}

/// Detailed herd record used for the assistant context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HerdRecord {
    pub id: String,
    pub name: String,
    pub breed: String,
    pub age: u32,
    pub weight: f64,
    pub last_calving_date: String,
    pub pregnancy_status: PregnancyStatus,
    pub health_status: RecordHealthStatus,
    pub daily_records: Vec<DailyRecord>,
}

impl HerdRecord {
    pub fn latest_record(&self) -> Option<&DailyRecord> {
        self.daily_records.last()
    }
}

pub fn dashboard_cows() -> Vec<Cow> {
    vec![
        Cow {
            id: 1,
            name: "Bessie".to_string(),
            age: 3,
            weight: 257.0,
            lactation_stage: LactationStage::Mid,
            milk_yield: 22.0,
            feed_intake: 33.0,
            current_methane_emission: 107.0,
        },
        Cow {
            id: 2,
            name: "Daisy".to_string(),
            age: 2,
            weight: 300.0,
            lactation_stage: LactationStage::Early,
            milk_yield: 20.0,
            feed_intake: 39.0,
            current_methane_emission: 113.0,
        },
        Cow {
            id: 3,
            name: "Molly".to_string(),
            age: 2,
            weight: 337.0,
            lactation_stage: LactationStage::Late,
            milk_yield: 19.0,
            feed_intake: 42.0,
            current_methane_emission: 97.0,
        },
    ]
}

pub fn find_cow(id: u32) -> Option<Cow> {
    dashboard_cows().into_iter().find(|cow| cow.id == id)
}

/// Case-sensitive name lookup, matching how cow names appear in links.
pub fn find_cow_by_name(name: &str) -> Option<Cow> {
    dashboard_cows().into_iter().find(|cow| cow.name == name)
}

fn record(
    date: &str,
    milk_production: f64,
    feed_intake: f64,
    water_intake: f64,
    health_notes: &str,
    temperature: f64,
    weight: f64,
) -> DailyRecord {
    DailyRecord {
        date: date.to_string(),
        milk_production,
        feed_intake,
        water_intake,
        health_notes: health_notes.to_string(),
        temperature,
        weight,
    }
}

pub fn record_herd() -> Vec<HerdRecord> {
    vec![
        HerdRecord {
            id: "1".to_string(),
            name: "Bessie".to_string(),
            breed: "Friesian".to_string(),
            age: 4,
            weight: 550.0,
            last_calving_date: "2023-12-15".to_string(),
            pregnancy_status: PregnancyStatus::NotPregnant,
            health_status: RecordHealthStatus::Healthy,
            daily_records: vec![
                record("2024-04-01", 25.5, 15.0, 60.0, "Normal appetite and behavior", 38.5, 550.0),
                record("2024-04-02", 26.2, 15.5, 62.0, "Slightly increased milk production", 38.4, 551.0),
            ],
        },
        HerdRecord {
            id: "2".to_string(),
            name: "Daisy".to_string(),
            breed: "Jersey".to_string(),
            age: 3,
            weight: 450.0,
            last_calving_date: "2023-11-20".to_string(),
            pregnancy_status: PregnancyStatus::Pregnant,
            health_status: RecordHealthStatus::Healthy,
            daily_records: vec![
                record("2024-04-01", 18.2, 12.0, 50.0, "Normal behavior, good appetite", 38.6, 450.0),
                record("2024-04-02", 17.8, 12.5, 52.0, "Slight decrease in milk production", 38.5, 451.0),
            ],
        },
        HerdRecord {
            id: "3".to_string(),
            name: "Molly".to_string(),
            breed: "Ayrshire".to_string(),
            age: 5,
            weight: 500.0,
            last_calving_date: "2023-10-10".to_string(),
            pregnancy_status: PregnancyStatus::Unknown,
            health_status: RecordHealthStatus::Sick,
            daily_records: vec![
                record("2024-04-01", 20.1, 10.0, 45.0, "Reduced appetite, showing signs of mastitis", 39.2, 498.0),
                record("2024-04-02", 18.5, 9.5, 40.0, "Under treatment for mastitis", 39.0, 497.0),
            ],
        },
    ]
}
