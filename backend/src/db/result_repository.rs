use chrono::Utc;
use shared::{AnalysisPayload, MatchedAnimal, PENDING_REVIEW_MESSAGE, ResultKind};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use super::RepositoryError;
use super::models::{IdentifiedResultRow, UnidentifiedResultRow};
use crate::classify::models::ClassificationOutcome;

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Invalid ID format: {0}")]
    InvalidIdentifier(String),
    #[error("Result not found: {0}")]
    NotFound(i64),
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

/// A unit of work against the result stores. Dropping it without
/// [`ResultRepository::persist`] rolls everything back.
pub type UnitOfWork = Transaction<'static, Sqlite>;

#[derive(Clone)]
pub struct ResultRepository {
    pool: SqlitePool,
}

impl ResultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<UnitOfWork, RepositoryError> {
        Ok(self.pool.begin().await?)
    }

    /// Writes `outcome` to the store chosen by its catalog match and commits.
    /// On any failure the whole unit is rolled back and nothing is visible.
    /// The returned payload is exactly what [`ResultRepository::fetch`] will
    /// reconstruct for the new id.
    pub async fn persist(
        &self,
        mut tx: UnitOfWork,
        outcome: &ClassificationOutcome,
    ) -> Result<AnalysisPayload, RepositoryError> {
        let created_at = Utc::now().to_rfc3339();

        match Self::write_outcome(&mut *tx, outcome, &created_at).await {
            Ok(payload) => {
                tx.commit().await?;
                log::info!(
                    "Persisted {} result {} for label '{}'",
                    payload.kind,
                    payload.id,
                    payload.label
                );
                Ok(payload)
            }
            Err(e) => {
                log::error!("Failed to persist outcome for {}: {}", outcome.image, e);
                if let Err(rollback_err) = tx.rollback().await {
                    log::error!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn write_outcome(
        conn: &mut SqliteConnection,
        outcome: &ClassificationOutcome,
        created_at: &str,
    ) -> Result<AnalysisPayload, RepositoryError> {
        let kind = outcome.kind();
        let id = Self::allocate_id(conn, kind, created_at).await?;

        let (matched_animal, message) = match &outcome.matched_animal {
            Some(animal) => {
                Self::insert_identified(conn, id, outcome, animal.id, created_at).await?;
                (Some(MatchedAnimal::from(animal.clone())), None)
            }
            None => {
                Self::insert_unidentified(conn, id, outcome, created_at).await?;
                Self::insert_analysis_log(conn, id, outcome, created_at).await?;
                (None, Some(PENDING_REVIEW_MESSAGE.to_string()))
            }
        };

        Ok(AnalysisPayload {
            id,
            kind,
            image: outcome.image.clone(),
            label: outcome.label.clone(),
            confidence: outcome.confidence,
            matched_animal,
            message,
            created_at: created_at.to_string(),
        })
    }

    async fn allocate_id(
        conn: &mut SqliteConnection,
        kind: ResultKind,
        created_at: &str,
    ) -> Result<i64, RepositoryError> {
        let result = sqlx::query("INSERT INTO result_ids (kind, created_at) VALUES (?1, ?2)")
            .bind(kind.to_string())
            .bind(created_at)
            .execute(&mut *conn)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn insert_identified(
        conn: &mut SqliteConnection,
        id: i64,
        outcome: &ClassificationOutcome,
        animal_id: i64,
        created_at: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO analysis_results (
                id, image_bucket, image_key, image_url, label, confidence, matched_animal_id, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(id)
        .bind(&outcome.image.bucket)
        .bind(&outcome.image.key)
        .bind(&outcome.image.url)
        .bind(&outcome.label)
        .bind(outcome.confidence)
        .bind(animal_id)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_unidentified(
        conn: &mut SqliteConnection,
        id: i64,
        outcome: &ClassificationOutcome,
        created_at: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO unidentified_animals (
                id, image_bucket, image_key, image_url, label, confidence, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(id)
        .bind(&outcome.image.bucket)
        .bind(&outcome.image.key)
        .bind(&outcome.image.url)
        .bind(&outcome.label)
        .bind(outcome.confidence)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_analysis_log(
        conn: &mut SqliteConnection,
        unidentified_id: i64,
        outcome: &ClassificationOutcome,
        created_at: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO analysis_log (unidentified_id, image_url, label, confidence, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(unidentified_id)
        .bind(&outcome.image.url)
        .bind(&outcome.label)
        .bind(outcome.confidence)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub fn parse_result_id(raw_id: &str) -> Result<i64, RetrievalError> {
        raw_id
            .trim()
            .parse::<i64>()
            .map_err(|_| RetrievalError::InvalidIdentifier(raw_id.to_string()))
    }

    /// Resolves an id from either persistence path, identified store first.
    pub async fn fetch(&self, raw_id: &str) -> Result<AnalysisPayload, RetrievalError> {
        let id = Self::parse_result_id(raw_id)?;

        if let Some(payload) = self.find_identified(id).await? {
            log::info!("Retrieved identified result {}", id);
            return Ok(payload);
        }

        if let Some(payload) = self.find_unidentified(id).await? {
            log::info!("Retrieved unidentified result {}", id);
            return Ok(payload);
        }

        log::warn!("Result {} not found in either store", id);
        Err(RetrievalError::NotFound(id))
    }

    async fn find_identified(&self, id: i64) -> Result<Option<AnalysisPayload>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentifiedResultRow>(
            r#"
            SELECT r.id, r.image_bucket, r.image_key, r.image_url, r.label, r.confidence,
                   r.matched_animal_id, r.created_at,
                   a.name AS animal_name,
                   a.species AS animal_species,
                   a.habitat AS animal_habitat,
                   a.diet AS animal_diet,
                   a.description AS animal_description
            FROM analysis_results r
            LEFT JOIN animals a ON a.id = r.matched_animal_id
            WHERE r.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(IdentifiedResultRow::into_payload))
    }

    async fn find_unidentified(&self, id: i64) -> Result<Option<AnalysisPayload>, RepositoryError> {
        let row = sqlx::query_as::<_, UnidentifiedResultRow>(
            r#"
            SELECT id, image_bucket, image_key, image_url, label, confidence, created_at
            FROM unidentified_animals
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UnidentifiedResultRow::into_payload))
    }
}
