use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Ebay,
}

/// Closed condition taxonomy. Anything the classifier cannot place
/// lands on `Unknown`, never on a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    Refurb,
    Used,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Expedited,
    Standard,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub value: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipping {
    pub cost: Option<f64>,
    pub eta_days: Option<i64>,
    pub method: ShippingMethod,
}

impl Default for Shipping {
    fn default() -> Self {
        Self {
            cost: None,
            eta_days: None,
            method: ShippingMethod::Unknown,
        }
    }
}

/// Return policy. `unknown = true` means the listing carried no return
/// terms at all, which is distinct from "returns not accepted".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Returns {
    pub available: bool,
    pub window_days: Option<i64>,
    pub unknown: bool,
}

impl Returns {
    pub fn unknown() -> Self {
        Self {
            available: false,
            window_days: None,
            unknown: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub name: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<i64>,
    pub is_official: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specs {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub key_terms: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    pub sponsored: bool,
    pub low_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    pub captured_at: DateTime<Utc>,
    pub notes: String,
}

/// Canonical, source-agnostic listing record. Every field is always
/// populated, with neutral defaults standing in for missing upstream data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub source: Source,
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub price: Price,
    pub condition: Condition,
    pub shipping: Shipping,
    pub returns: Returns,
    pub seller: Seller,
    pub specs: Specs,
    pub signals: Signals,
    pub raw: RawData,
}
