use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Review state of a fraud log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudLogStatus {
    Pending,
    Dismissed,
}

impl FraudLogStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(FraudLogStatus::Pending),
            "dismissed" => Ok(FraudLogStatus::Dismissed),
            _ => Err(format!("Invalid fraud log status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudLogStatus::Pending => "pending",
            FraudLogStatus::Dismissed => "dismissed",
        }
    }
}

impl From<String> for FraudLogStatus {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(FraudLogStatus::Dismissed)
    }
}

impl From<FraudLogStatus> for String {
    fn from(status: FraudLogStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Observed activity counters for one subject, gathered by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FraudSignals {
    /// Orders placed by the customer in the trailing 24 hours
    pub orders_last_24h: i64,
    /// Amount of the order under review
    pub order_amount: Decimal,
    /// Reviews written by the user in the trailing 7 days
    pub reviews_last_7d: i64,
    /// Whether every review by the user is 5-star
    pub all_five_star_reviews: bool,
    /// Largest listing price change, percent
    pub price_change_pct: f64,
    /// Stock mutations on the listing in the trailing 24 hours
    pub stock_mutations_last_24h: i64,
}

/// Outcome of the rule-based fraud scoring.
///
/// A scored advisory, not an error: `action_required` routes the subject to
/// manual review, it never blocks the triggering operation by itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAssessment {
    pub risk_score: i32,
    pub reasons: Vec<String>,
    pub action_required: bool,
    pub status: FraudLogStatus,
}

/// Persisted assessment in the `marketplace_fraud_logs` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FraudLog {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub risk_score: i32,
    pub reasons: Value, // JSONB stored as serde_json::Value
    pub action_required: bool,
    pub status: String, // Stored as TEXT, use FraudLogStatus enum for type safety
    pub created_at: NaiveDateTime,
}

impl FraudLog {
    /// Get status as an enum
    pub fn status_enum(&self) -> FraudLogStatus {
        FraudLogStatus::from_str(&self.status).unwrap_or(FraudLogStatus::Dismissed)
    }

    /// Get the anomaly descriptions recorded with this entry
    pub fn reasons_vec(&self) -> Vec<String> {
        match &self.reasons {
            Value::Array(arr) => arr
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect(),
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraud_log_status_conversion() {
        assert_eq!(FraudLogStatus::Pending.as_str(), "pending");
        assert_eq!(
            FraudLogStatus::from_str("dismissed").unwrap(),
            FraudLogStatus::Dismissed
        );
        assert!(FraudLogStatus::from_str("escalated").is_err());
    }

    #[test]
    fn test_reasons_vec() {
        let log = FraudLog {
            id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            risk_score: 65,
            reasons: serde_json::json!(["order velocity", "large order amount"]),
            action_required: true,
            status: "pending".to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        };

        assert_eq!(log.reasons_vec().len(), 2);
        assert_eq!(log.status_enum(), FraudLogStatus::Pending);
    }
}
