use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of signal a pricing rule reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorType {
    TimeOfDay,
    Distance,
    Weather,
    Traffic,
    Demand,
}

impl FactorType {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "time_of_day" => Ok(FactorType::TimeOfDay),
            "distance" => Ok(FactorType::Distance),
            "weather" => Ok(FactorType::Weather),
            "traffic" => Ok(FactorType::Traffic),
            "demand" => Ok(FactorType::Demand),
            _ => Err(format!("Invalid factor type: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorType::TimeOfDay => "time_of_day",
            FactorType::Distance => "distance",
            FactorType::Weather => "weather",
            FactorType::Traffic => "traffic",
            FactorType::Demand => "demand",
        }
    }
}

impl From<String> for FactorType {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(FactorType::Demand)
    }
}

impl From<FactorType> for String {
    fn from(factor_type: FactorType) -> Self {
        factor_type.as_str().to_string()
    }
}

/// Structured predicate data attached to a pricing rule.
///
/// Only the fields relevant to the rule's `factor_type` are set; absent
/// fields never veto a rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConditions {
    /// Hours (0-23) during which a time_of_day rule applies
    pub peak_hours: Option<Vec<u32>>,
    /// Minimum delivery distance for a distance rule
    pub min_distance_km: Option<f64>,
    /// Minimum provider weather score for a weather rule
    pub min_weather_score: Option<f64>,
    /// Minimum provider traffic score for a traffic rule
    pub min_traffic_score: Option<f64>,
    /// Restrict a demand rule to weekends
    pub weekend_only: Option<bool>,
}

/// Administrator-managed pricing rule in the `pricing_factors` table.
///
/// Read at evaluation time; changes take effect on the next calculation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PricingFactorRule {
    pub id: Uuid,
    pub factor_type: String, // Stored as TEXT, use FactorType enum for type safety
    pub factor_name: String,
    pub multiplier: f64,
    pub conditions: Value, // JSONB stored as serde_json::Value
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl PricingFactorRule {
    /// Get factor type as an enum
    pub fn factor_type_enum(&self) -> FactorType {
        FactorType::from_str(&self.factor_type).unwrap_or(FactorType::Demand)
    }

    /// Get the structured conditions, tolerating malformed rows
    pub fn conditions(&self) -> RuleConditions {
        serde_json::from_value(self.conditions.clone()).unwrap_or_default()
    }
}

/// A rule that matched an order context and contributed to its multiplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedFactor {
    pub factor_type: String,
    pub factor_name: String,
    pub multiplier: f64,
}
