use crate::errors::{AppError, ResultExt};
use crate::models::CardCategory;
use sqlx::PgPool;

/// One catalog entry as seeded.
pub struct SeedCard {
    pub name: &'static str,
    pub issuer: &'static str,
    pub annual_fee: i64,
    pub reward_rate: &'static str,
    pub signup_bonus: &'static str,
    pub benefits: &'static [&'static str],
    pub category: CardCategory,
}

/// The static card catalog.
pub fn sample_cards() -> Vec<SeedCard> {
    vec![
        SeedCard {
            name: "Chase Sapphire Preferred",
            issuer: "Chase",
            annual_fee: 95,
            reward_rate: "2x points on travel and dining",
            signup_bonus: "60,000 points after $4,000 spend in 3 months",
            benefits: &[
                "No foreign transaction fees",
                "Travel insurance",
                "Points transferable to partners",
            ],
            category: CardCategory::Travel,
        },
        SeedCard {
            name: "Amex Gold Card",
            issuer: "American Express",
            annual_fee: 250,
            reward_rate: "4x points on dining and groceries",
            signup_bonus: "60,000 points after $4,000 spend in 6 months",
            benefits: &[
                "Dining credits",
                "No foreign transaction fees",
                "Travel perks",
            ],
            category: CardCategory::Dining,
        },
        SeedCard {
            name: "Citi Double Cash",
            issuer: "Citi",
            annual_fee: 0,
            reward_rate: "2% cashback on all purchases",
            signup_bonus: "$200 cashback after $1,500 spend in 6 months",
            benefits: &["No annual fee", "Cashback rewards"],
            category: CardCategory::Cashback,
        },
        SeedCard {
            name: "Discover it Cash Back",
            issuer: "Discover",
            annual_fee: 0,
            reward_rate: "5% cashback on rotating categories",
            signup_bonus: "Cashback match after first year",
            benefits: &["No annual fee", "Free FICO score"],
            category: CardCategory::Cashback,
        },
        SeedCard {
            name: "Capital One Venture",
            issuer: "Capital One",
            annual_fee: 95,
            reward_rate: "2x miles on all purchases",
            signup_bonus: "75,000 miles after $4,000 spend in 3 months",
            benefits: &[
                "Global Entry/TSA PreCheck credit",
                "No foreign transaction fees",
            ],
            category: CardCategory::Travel,
        },
    ]
}

/// One-time catalog seed. Skips entirely when cards already exist, so the
/// catalog stays immutable after first boot. Returns the number of cards
/// inserted.
pub async fn seed_credit_cards(pool: &PgPool) -> Result<usize, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM credit_cards")
        .fetch_one(pool)
        .await
        .context("counting catalog cards")?;

    if count > 0 {
        tracing::info!("Card catalog already seeded ({} cards)", count);
        return Ok(0);
    }

    let cards = sample_cards();
    let mut tx = pool.begin().await?;
    for card in &cards {
        let benefits: Vec<String> = card.benefits.iter().map(|b| b.to_string()).collect();
        sqlx::query(
            "INSERT INTO credit_cards \
             (name, issuer, annual_fee, reward_rate, signup_bonus, benefits, category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(card.name)
        .bind(card.issuer)
        .bind(card.annual_fee)
        .bind(card.reward_rate)
        .bind(card.signup_bonus)
        .bind(&benefits)
        .bind(card.category)
        .execute(&mut *tx)
        .await
        .context("inserting seed card")?;
    }
    tx.commit().await?;

    tracing::info!("Card catalog seeded with {} cards", cards.len());
    Ok(cards.len())
}
