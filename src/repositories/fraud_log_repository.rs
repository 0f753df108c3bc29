//! Repository for fraud assessment logs

use crate::error::RepositoryError;
use crate::models::{FraudAssessment, FraudLog};
use sqlx::PgPool;
use uuid::Uuid;

pub struct FraudLogRepository {
    pool: PgPool,
}

impl FraudLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist an assessment against a subject
    pub async fn create(
        &self,
        subject_id: Uuid,
        assessment: &FraudAssessment,
    ) -> Result<FraudLog, RepositoryError> {
        let reasons = serde_json::to_value(&assessment.reasons)
            .map_err(|e| RepositoryError::InvalidInput(format!("Unserializable reasons: {}", e)))?;

        let log = sqlx::query_as::<_, FraudLog>(
            r#"
            INSERT INTO marketplace_fraud_logs
                (id, subject_id, risk_score, reasons, action_required, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id, subject_id, risk_score, reasons, action_required, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(subject_id)
        .bind(assessment.risk_score)
        .bind(reasons)
        .bind(assessment.action_required)
        .bind(assessment.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    /// Fetch entries awaiting manual review, oldest first
    pub async fn find_pending(&self, limit: i64) -> Result<Vec<FraudLog>, RepositoryError> {
        let logs = sqlx::query_as::<_, FraudLog>(
            r#"
            SELECT id, subject_id, risk_score, reasons, action_required, status, created_at
            FROM marketplace_fraud_logs
            WHERE status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    /// Fetch a subject's assessment history, newest first
    pub async fn find_by_subject(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<FraudLog>, RepositoryError> {
        let logs = sqlx::query_as::<_, FraudLog>(
            r#"
            SELECT id, subject_id, risk_score, reasons, action_required, status, created_at
            FROM marketplace_fraud_logs
            WHERE subject_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
