//! Learner repository implementation

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::database::DatabasePool;
use crate::models::{LearnerProfile, LearnerState, PendingQuestion};
use crate::utils::errors::PjotinhaError;

const LEARNER_COLUMNS: &str = "id, sender_id, stage, name, course, term, interests, score, \
     pending_module, pending_number, pending_question, pending_answer, created_at, updated_at";

/// Row of the `learners` table
#[derive(Debug, Clone, FromRow)]
pub struct LearnerRow {
    pub id: i64,
    pub sender_id: String,
    pub stage: String,
    pub name: Option<String>,
    pub course: Option<String>,
    pub term: Option<String>,
    pub interests: Option<String>,
    pub score: i64,
    pub pending_module: Option<i64>,
    pub pending_number: Option<i64>,
    pub pending_question: Option<String>,
    pub pending_answer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LearnerRow> for LearnerState {
    type Error = PjotinhaError;

    fn try_from(row: LearnerRow) -> Result<Self, Self::Error> {
        let pending_quiz = match (
            row.pending_module,
            row.pending_number,
            row.pending_question,
            row.pending_answer,
        ) {
            (Some(module), Some(number), Some(prompt), Some(answer)) => Some(PendingQuestion {
                module: to_index(module)?,
                number: to_index(number)?,
                prompt,
                answer: answer.parse()?,
            }),
            _ => None,
        };

        Ok(LearnerState {
            sender_id: row.sender_id,
            stage: row.stage.parse()?,
            profile: LearnerProfile {
                name: row.name,
                course: row.course,
                term: row.term,
                interests: row.interests,
            },
            score: u32::try_from(row.score.max(0)).unwrap_or(u32::MAX),
            pending_quiz,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn to_index(value: i64) -> Result<u32, PjotinhaError> {
    u32::try_from(value).map_err(|_| PjotinhaError::InvalidInput(format!("Invalid index: {}", value)))
}

#[derive(Clone, Debug)]
pub struct LearnerRepository {
    pool: DatabasePool,
}

impl LearnerRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Find learner by sender id
    pub async fn find_by_sender(&self, sender_id: &str) -> Result<Option<LearnerState>, PjotinhaError> {
        let row = sqlx::query_as::<_, LearnerRow>(&format!(
            "SELECT {} FROM learners WHERE sender_id = ?",
            LEARNER_COLUMNS
        ))
        .bind(sender_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LearnerState::try_from).transpose()
    }

    /// Insert a fresh learner at the start stage
    pub async fn create(&self, sender_id: &str) -> Result<LearnerState, PjotinhaError> {
        let state = LearnerState::new(sender_id);

        let result = sqlx::query(
            r#"
            INSERT INTO learners (sender_id, stage, score, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?)
            "#,
        )
        .bind(&state.sender_id)
        .bind(state.stage.to_string())
        .bind(state.created_at)
        .bind(state.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(state),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(PjotinhaError::LearnerExists {
                sender_id: sender_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or replace the full learner record inside one transaction
    pub async fn upsert(&self, state: &LearnerState) -> Result<(), PjotinhaError> {
        let pending = state.pending_quiz.as_ref();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO learners (sender_id, stage, name, course, term, interests, score,
                                  pending_module, pending_number, pending_question, pending_answer,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(sender_id) DO UPDATE SET
                stage = excluded.stage,
                name = excluded.name,
                course = excluded.course,
                term = excluded.term,
                interests = excluded.interests,
                score = excluded.score,
                pending_module = excluded.pending_module,
                pending_number = excluded.pending_number,
                pending_question = excluded.pending_question,
                pending_answer = excluded.pending_answer,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&state.sender_id)
        .bind(state.stage.to_string())
        .bind(&state.profile.name)
        .bind(&state.profile.course)
        .bind(&state.profile.term)
        .bind(&state.profile.interests)
        .bind(i64::from(state.score))
        .bind(pending.map(|q| i64::from(q.module)))
        .bind(pending.map(|q| i64::from(q.number)))
        .bind(pending.map(|q| q.prompt.clone()))
        .bind(pending.map(|q| q.answer.to_string()))
        .bind(state.created_at)
        .bind(state.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Count learners
    pub async fn count(&self) -> Result<i64, PjotinhaError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM learners")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
