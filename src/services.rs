use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::push_client::PushClient;
use crate::scoring::score_card;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Generates and reads per-user recommendation batches.
pub struct RecommendationService {
    pool: PgPool,
}

impl RecommendationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Regenerates the full recommendation batch for one user.
    ///
    /// Scores every catalog card against the profile, sorts by score
    /// descending (stable sort, so ties keep catalog order), and replaces the
    /// prior batch with delete-then-insert inside one transaction so a
    /// concurrent read never sees a partial batch.
    pub async fn generate(&self, user_id: &str) -> Result<Vec<Recommendation>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("loading profile for recommendation generation")?
        .ok_or_else(|| {
            AppError::ProfileMissing(format!("No profile exists for user {}", user_id))
        })?;

        // Catalog order is seed order; it doubles as the tie-break.
        let cards = sqlx::query_as::<_, CreditCard>(
            "SELECT * FROM credit_cards ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("loading card catalog")?;

        let mut drafts: Vec<(CreditCard, i32, MatchReason)> = cards
            .into_iter()
            .map(|card| {
                let (score, reason) = score_card(&profile, &card);
                (card, score, reason)
            })
            .collect();
        drafts.sort_by(|a, b| b.1.cmp(&a.1));

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM recommendations WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut batch = Vec::with_capacity(drafts.len());
        for (rank, (card, score, reason)) in drafts.into_iter().enumerate() {
            let row = sqlx::query_as::<_, RecommendationRow>(
                "INSERT INTO recommendations (user_id, credit_card_id, match_score, reason, rank) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING *",
            )
            .bind(user_id)
            .bind(card.id)
            .bind(score)
            .bind(sqlx::types::Json(&reason))
            .bind(rank as i32)
            .fetch_one(&mut *tx)
            .await?;
            batch.push(card.expand_recommendation(row));
        }

        tx.commit().await?;

        tracing::info!(
            "Generated {} recommendations for user {}",
            batch.len(),
            user_id
        );
        Ok(batch)
    }

    /// Returns the persisted batch ordered by score descending. Does not
    /// auto-generate when empty; that decision belongs to the caller.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Recommendation>, AppError> {
        let rows = sqlx::query_as::<_, RecommendationRow>(
            "SELECT * FROM recommendations WHERE user_id = $1 \
             ORDER BY match_score DESC, rank ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("loading recommendation batch")?;

        let cards = fetch_cards_by_ids(
            &self.pool,
            rows.iter().map(|r| r.credit_card_id).collect(),
        )
        .await?;

        rows.into_iter()
            .map(|row| {
                let card = cards.get(&row.credit_card_id).cloned().ok_or_else(|| {
                    AppError::InternalError(format!(
                        "recommendation {} references missing card {}",
                        row.id, row.credit_card_id
                    ))
                })?;
                Ok(card.expand_recommendation(row))
            })
            .collect()
    }
}

/// Records card applications and fires their notification side effects.
pub struct ApplicationService {
    pool: PgPool,
    push_client: PushClient,
}

impl ApplicationService {
    pub fn new(pool: PgPool, push_client: PushClient) -> Self {
        Self { pool, push_client }
    }

    /// Creates a pending application for `credit_card_id`.
    ///
    /// The card must exist; nothing is written otherwise. The application row
    /// is persisted first, then the notification side effects run best-effort:
    /// a failure there is logged and never fails the application itself.
    pub async fn apply(
        &self,
        user_id: &str,
        credit_card_id: Uuid,
    ) -> Result<Application, AppError> {
        let card = sqlx::query_as::<_, CreditCard>("SELECT * FROM credit_cards WHERE id = $1")
            .bind(credit_card_id)
            .fetch_optional(&self.pool)
            .await
            .context("looking up card for application")?
            .ok_or_else(|| {
                AppError::CardNotFound(format!("No credit card with id {}", credit_card_id))
            })?;

        let row = sqlx::query_as::<_, ApplicationRow>(
            "INSERT INTO applications (user_id, credit_card_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(credit_card_id)
        .fetch_one(&self.pool)
        .await
        .context("creating application")?;

        tracing::info!(
            "Application {} created for user {} (card {})",
            row.id,
            user_id,
            card.name
        );

        if let Err(e) = self.notify_submission(user_id, &card).await {
            tracing::warn!(
                "Notification side effect failed for application {} (non-fatal): {}",
                row.id,
                e
            );
        }

        Ok(card.expand_application(row))
    }

    /// In-app notification plus optional push. The in-app record is the
    /// durable source of truth; push delivery failure is logged and swallowed.
    async fn notify_submission(&self, user_id: &str, card: &CreditCard) -> Result<(), AppError> {
        let message = format!(
            "Your application for {} has been submitted and is pending.",
            card.name
        );
        sqlx::query("INSERT INTO notifications (user_id, message) VALUES ($1, $2)")
            .bind(user_id)
            .bind(&message)
            .execute(&self.pool)
            .await
            .context("creating in-app notification")?;

        let profile =
            sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .context("loading profile for push dispatch")?;

        if let Some(token) = profile.and_then(|p| p.push_token) {
            let body = format!("Your application for {} is pending.", card.name);
            if let Err(e) = self
                .push_client
                .send(&token, "Application Submitted", &body)
                .await
            {
                tracing::warn!("Push delivery failed for user {} (non-fatal): {}", user_id, e);
            }
        }

        Ok(())
    }

    /// All applications for a user, newest first, with cards expanded.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Application>, AppError> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE user_id = $1 ORDER BY applied_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("loading applications")?;

        let cards = fetch_cards_by_ids(
            &self.pool,
            rows.iter().map(|r| r.credit_card_id).collect(),
        )
        .await?;

        rows.into_iter()
            .map(|row| {
                let card = cards.get(&row.credit_card_id).cloned().ok_or_else(|| {
                    AppError::InternalError(format!(
                        "application {} references missing card {}",
                        row.id, row.credit_card_id
                    ))
                })?;
                Ok(card.expand_application(row))
            })
            .collect()
    }
}

/// Explicit join step for the expand-on-read pattern: storage stays
/// normalized, the referenced cards are fetched and composed at the boundary.
async fn fetch_cards_by_ids(
    pool: &PgPool,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, CreditCard>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let cards = sqlx::query_as::<_, CreditCard>("SELECT * FROM credit_cards WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(pool)
        .await
        .context("expanding card references")?;

    Ok(cards.into_iter().map(|c| (c.id, c)).collect())
}
