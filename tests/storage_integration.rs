use std::env;
use uuid::Uuid;

use cardmatch_api::db::Database;
use cardmatch_api::models::{CardCategory, CreditScoreBand, Notification};
use cardmatch_api::push_client::PushClient;
use cardmatch_api::seed;
use cardmatch_api::services::{ApplicationService, RecommendationService};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// End-to-end smoke test over a real database: seed, profile, recommendation
/// batch replace semantics, application workflow with a failing push gateway.
/// Marked ignored to avoid running against production by accident; set
/// TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn recommendation_and_application_flow_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url).await?;
    seed::seed_credit_cards(&db.pool)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    // Unique user per run to avoid conflicts on repeated invocations.
    let user_id = format!("smoke-{}", Uuid::new_v4());

    sqlx::query(
        "INSERT INTO user_profiles \
         (user_id, name, annual_income, credit_score, primary_spending_category, push_token) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&user_id)
    .bind("Smoke Tester")
    .bind(120_000i64)
    .bind(CreditScoreBand::Excellent)
    .bind(CardCategory::Travel)
    .bind("smoke-device-token")
    .execute(&db.pool)
    .await?;

    // Generate: one recommendation per catalog card, sorted descending.
    let recs = RecommendationService::new(db.pool.clone());
    let batch = recs
        .generate(&user_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(batch.len(), 5);
    assert!(batch
        .windows(2)
        .all(|w| w[0].match_score >= w[1].match_score));
    let distinct: std::collections::HashSet<Uuid> =
        batch.iter().map(|r| r.credit_card.id).collect();
    assert_eq!(distinct.len(), 5);

    // Regenerate: replace, not append; scores identical for unchanged inputs.
    let second = recs
        .generate(&user_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(second.len(), 5);
    let first_scores: Vec<i32> = batch.iter().map(|r| r.match_score).collect();
    let second_scores: Vec<i32> = second.iter().map(|r| r.match_score).collect();
    assert_eq!(first_scores, second_scores);
    let listed = recs
        .list(&user_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(listed.len(), 5);

    // Apply with a push gateway that always fails: the application and the
    // in-app notification must still land.
    let push_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&push_server)
        .await;
    let push_client =
        PushClient::new(push_server.uri()).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let apps = ApplicationService::new(db.pool.clone(), push_client);
    let card_id = batch[0].credit_card.id;
    let application = apps
        .apply(&user_id, card_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(application.credit_card.id, card_id);

    let listed_apps = apps
        .list(&user_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(listed_apps.len(), 1);

    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(&user_id)
    .fetch_all(&db.pool)
    .await?;
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].message.contains(&application.credit_card.name));
    assert!(!notifications[0].read);

    // Mark-as-read is idempotent.
    for _ in 0..2 {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(notifications[0].id)
        .bind(&user_id)
        .execute(&db.pool)
        .await?;
        assert_eq!(result.rows_affected(), 1);
    }

    // Applying for a card that does not exist writes nothing.
    let missing = apps.apply(&user_id, Uuid::new_v4()).await;
    assert_eq!(missing.unwrap_err().code(), "CARD_NOT_FOUND");
    let still_one = apps
        .list(&user_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(still_one.len(), 1);

    Ok(())
}
