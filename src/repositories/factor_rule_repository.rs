//! Repository for administrator-managed pricing rules

use crate::error::RepositoryError;
use crate::models::{FactorType, PricingFactorRule, RuleConditions};
use sqlx::PgPool;
use uuid::Uuid;

pub struct FactorRuleRepository {
    pool: PgPool,
}

impl FactorRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new pricing rule
    pub async fn create(
        &self,
        factor_type: FactorType,
        factor_name: &str,
        multiplier: f64,
        conditions: &RuleConditions,
    ) -> Result<PricingFactorRule, RepositoryError> {
        if multiplier <= 0.0 {
            return Err(RepositoryError::InvalidInput(
                "Rule multiplier must be greater than 0".to_string(),
            ));
        }

        let conditions = serde_json::to_value(conditions)
            .map_err(|e| RepositoryError::InvalidInput(format!("Unserializable conditions: {}", e)))?;

        let rule = sqlx::query_as::<_, PricingFactorRule>(
            r#"
            INSERT INTO pricing_factors
                (id, factor_type, factor_name, multiplier, conditions, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING
                id, factor_type, factor_name, multiplier, conditions, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(factor_type.as_str())
        .bind(factor_name)
        .bind(multiplier)
        .bind(conditions)
        .fetch_one(&self.pool)
        .await?;

        Ok(rule)
    }

    /// Fetch all rules that currently apply.
    ///
    /// Called on every evaluation: rule changes take effect on the next
    /// calculation without any cache to invalidate.
    pub async fn find_active(&self) -> Result<Vec<PricingFactorRule>, RepositoryError> {
        let rules = sqlx::query_as::<_, PricingFactorRule>(
            r#"
            SELECT
                id, factor_type, factor_name, multiplier, conditions, is_active, created_at
            FROM pricing_factors
            WHERE is_active = TRUE
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    /// Enable or disable a rule
    pub async fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<PricingFactorRule, RepositoryError> {
        let rule = sqlx::query_as::<_, PricingFactorRule>(
            r#"
            UPDATE pricing_factors
            SET is_active = $2
            WHERE id = $1
            RETURNING
                id, factor_type, factor_name, multiplier, conditions, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Pricing rule {} not found", id)))?;

        Ok(rule)
    }
}
