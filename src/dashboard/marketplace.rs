use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Buyer,
    Feed,
    Service,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Listing {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ListingKind,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub location: String,
    pub contact: String,
}

/// Marketplace tab selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingFilter {
    #[default]
    All,
    Only(ListingKind),
}

impl FromStr for ListingFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(ListingFilter::All),
            "buyer" => Ok(ListingFilter::Only(ListingKind::Buyer)),
            "feed" => Ok(ListingFilter::Only(ListingKind::Feed)),
            "service" => Ok(ListingFilter::Only(ListingKind::Service)),
            other => Err(AppError::InvalidInput(format!(
                "Unknown listing type '{}'",
                other
            ))),
        }
    }
}

impl ListingFilter {
    fn matches(&self, kind: ListingKind) -> bool {
        match self {
            ListingFilter::All => true,
            ListingFilter::Only(wanted) => *wanted == kind,
        }
    }
}

pub fn listings() -> Vec<Listing> {
    vec![
        Listing {
            id: "1".to_string(),
            kind: ListingKind::Buyer,
            title: "Milk Processing Company".to_string(),
            description: "Looking to buy fresh milk daily. Minimum 50 liters per day.".to_string(),
            price: Some("KES 50 per liter".to_string()),
            location: "Nairobi".to_string(),
            contact: "+254 700 000 000".to_string(),
        },
        Listing {
            id: "2".to_string(),
            kind: ListingKind::Feed,
            title: "Premium Dairy Feed".to_string(),
            description: "High-quality dairy feed with 18% protein content.".to_string(),
            price: Some("KES 2,500 per 50kg bag".to_string()),
            location: "Kiambu".to_string(),
            contact: "+254 700 000 001".to_string(),
        },
        Listing {
            id: "3".to_string(),
            kind: ListingKind::Service,
            title: "Veterinary Services".to_string(),
            description: "Mobile veterinary services for dairy farms.".to_string(),
            price: Some("KES 1,500 per visit".to_string()),
            location: "Nakuru".to_string(),
            contact: "+254 700 000 002".to_string(),
        },
    ]
}

/// Listings whose title contains `query` (case-insensitive) and whose type
/// passes `filter`.
pub fn search_listings(query: &str, filter: ListingFilter) -> Vec<Listing> {
    let needle = query.to_lowercase();
    listings()
        .into_iter()
        .filter(|l| l.title.to_lowercase().contains(&needle) && filter.matches(l.kind))
        .collect()
}
