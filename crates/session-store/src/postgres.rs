use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CandidateId, SessionId, Version, VoterId};
use domain::{RepositoryError, VotingSession, VotingSessionRepository, VotingStatus};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::expect_single_row;

/// PostgreSQL-backed voting session repository.
///
/// Sessions live in the `voting_sessions` table, one row per session, with
/// the votes held in a `jsonb` column.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new PostgreSQL repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_session(row: PgRow) -> Result<VotingSession> {
        let candidates: Vec<Uuid> = row.try_get("candidates")?;
        let status: String = row.try_get("status")?;
        let votes: BTreeMap<CandidateId, Vec<VoterId>> =
            serde_json::from_value(row.try_get("votes")?)?;

        Ok(VotingSession::builder()
            .id(SessionId::from_uuid(row.try_get::<Uuid, _>("id")?))
            .name(row.try_get::<String, _>("name")?)
            .candidates(candidates.into_iter().map(CandidateId::from).collect())
            .status(status.parse::<VotingStatus>()?)
            .created_at(row.try_get::<DateTime<Utc>, _>("created_at")?)
            .closed_at(row.try_get::<Option<DateTime<Utc>>, _>("closed_at")?)
            .version(Version::new(row.try_get("version")?))
            .votes(votes)
            .build())
    }
}

#[async_trait]
impl VotingSessionRepository for PostgresSessionRepository {
    async fn find(&self, id: SessionId) -> std::result::Result<VotingSession, RepositoryError> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, name, candidates, status, votes, created_at, closed_at, version
            FROM voting_sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        match row {
            Some(row) => Ok(Self::row_to_session(row)?),
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    async fn save(&self, session: &VotingSession) -> std::result::Result<Version, RepositoryError> {
        let id = session.id();
        let candidates: Vec<Uuid> = session.candidates().iter().map(|c| c.as_uuid()).collect();
        let votes = serde_json::to_value(session.votes()).map_err(StoreError::from)?;

        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;

        let (rows, new_version) = if session.version().is_initial() {
            // A concurrent insert of the same id shows up as zero rows.
            let result = sqlx::query(
                r#"
                INSERT INTO voting_sessions (id, name, candidates, status, votes, created_at, closed_at, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(id.as_uuid())
            .bind(session.name())
            .bind(&candidates)
            .bind(session.status().as_str())
            .bind(&votes)
            .bind(session.created_at())
            .bind(session.closed_at())
            .bind(Version::first().as_i64())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;

            (result.rows_affected(), Version::first())
        } else {
            let result = sqlx::query(
                r#"
                UPDATE voting_sessions
                SET name = $1, candidates = $2, status = $3, votes = $4, closed_at = $5,
                    version = version + 1
                WHERE id = $6 AND version = $7
                "#,
            )
            .bind(session.name())
            .bind(&candidates)
            .bind(session.status().as_str())
            .bind(&votes)
            .bind(session.closed_at())
            .bind(id.as_uuid())
            .bind(session.version().as_i64())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;

            (result.rows_affected(), session.version().next())
        };

        // Dropping the transaction on error rolls it back.
        expect_single_row(id, rows)?;

        tx.commit().await.map_err(StoreError::from)?;
        tracing::debug!(voting_session_id = %id, version = %new_version, "voting session saved");
        Ok(new_version)
    }
}
