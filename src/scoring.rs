use crate::models::{CreditCard, CreditScoreBand, MatchReason, UserProfile};

/// Lower bound of the final score.
pub const MIN_SCORE: i64 = 0;
/// Upper bound of the final score.
pub const MAX_SCORE: i64 = 100;
/// Starting point before any profile-based adjustment.
const BASE_SCORE: i64 = 60;

/// Scores how well one catalog card fits one user profile.
///
/// Pure and deterministic: identical inputs always produce identical output.
/// Rules apply in a fixed order to an unclamped running total, clamped to
/// [0, 100] only at the end:
///
/// 1. base 60
/// 2. credit band: excellent/very good +20, poor -20
/// 3. primary spending category matches the card category: +15
/// 4. annual income above 100k: +10
/// 5. annual fee above 100 with income unknown or below 50k: -15
///
/// Callers must not invoke this without a profile; the recommendation
/// generator checks that precondition first.
pub fn score_card(profile: &UserProfile, card: &CreditCard) -> (i32, MatchReason) {
    let mut score = BASE_SCORE;

    match profile.credit_score {
        Some(CreditScoreBand::Excellent) | Some(CreditScoreBand::VeryGood) => score += 20,
        Some(CreditScoreBand::Poor) => score -= 20,
        _ => {}
    }

    let category_match = profile.primary_spending_category == Some(card.category);
    if category_match {
        score += 15;
    }

    if matches!(profile.annual_income, Some(income) if income > 100_000) {
        score += 10;
    }

    let low_income = match profile.annual_income {
        None => true,
        Some(income) => income < 50_000,
    };
    if card.annual_fee > 100 && low_income {
        score -= 15;
    }

    let reason = MatchReason {
        credit_score: profile.credit_score,
        category_match,
        income: profile.annual_income,
    };

    (score.clamp(MIN_SCORE, MAX_SCORE) as i32, reason)
}
