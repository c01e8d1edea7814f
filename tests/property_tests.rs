/// Property-based tests for the scoring engine.
/// Invariants that must hold for every profile/card combination.
use cardmatch_api::models::{CardCategory, CreditCard, CreditScoreBand, UserProfile};
use cardmatch_api::scoring::score_card;
use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

fn any_category() -> impl Strategy<Value = CardCategory> {
    prop::sample::select(vec![
        CardCategory::Travel,
        CardCategory::Dining,
        CardCategory::Cashback,
        CardCategory::General,
        CardCategory::Shopping,
    ])
}

fn any_credit_score() -> impl Strategy<Value = Option<CreditScoreBand>> {
    prop::sample::select(vec![
        None,
        Some(CreditScoreBand::Poor),
        Some(CreditScoreBand::Fair),
        Some(CreditScoreBand::Good),
        Some(CreditScoreBand::VeryGood),
        Some(CreditScoreBand::Excellent),
    ])
}

fn make_profile(
    credit_score: Option<CreditScoreBand>,
    category: Option<CardCategory>,
    income: Option<i64>,
) -> UserProfile {
    UserProfile {
        user_id: "uid-prop".to_string(),
        name: None,
        phone: None,
        dob: None,
        annual_income: income,
        credit_score,
        monthly_spending: None,
        primary_spending_category: category,
        push_token: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn make_card(category: CardCategory, annual_fee: i64) -> CreditCard {
    CreditCard {
        id: Uuid::new_v4(),
        name: "Prop Card".to_string(),
        issuer: "Prop Bank".to_string(),
        annual_fee,
        reward_rate: "1x".to_string(),
        signup_bonus: "none".to_string(),
        benefits: vec![],
        category,
        created_at: Utc::now(),
    }
}

proptest! {
    #[test]
    fn score_always_within_bounds(
        credit_score in any_credit_score(),
        profile_category in prop::option::of(any_category()),
        income in prop::option::of(0i64..=10_000_000_000),
        card_category in any_category(),
        annual_fee in 0i64..=1_000_000,
    ) {
        let p = make_profile(credit_score, profile_category, income);
        let c = make_card(card_category, annual_fee);
        let (score, _) = score_card(&p, &c);
        prop_assert!((0..=100).contains(&score));
    }

    #[test]
    fn score_is_pure(
        credit_score in any_credit_score(),
        profile_category in prop::option::of(any_category()),
        income in prop::option::of(0i64..=10_000_000_000),
        card_category in any_category(),
        annual_fee in 0i64..=1_000_000,
    ) {
        let p = make_profile(credit_score, profile_category, income);
        let c = make_card(card_category, annual_fee);
        prop_assert_eq!(score_card(&p, &c), score_card(&p, &c));
    }

    #[test]
    fn excellent_never_scores_below_poor(
        profile_category in prop::option::of(any_category()),
        income in prop::option::of(0i64..=10_000_000_000),
        card_category in any_category(),
        annual_fee in 0i64..=1_000_000,
    ) {
        let c = make_card(card_category, annual_fee);
        let excellent = make_profile(Some(CreditScoreBand::Excellent), profile_category, income);
        let poor = make_profile(Some(CreditScoreBand::Poor), profile_category, income);
        prop_assert!(score_card(&excellent, &c).0 >= score_card(&poor, &c).0);
    }

    #[test]
    fn category_match_never_lowers_score(
        credit_score in any_credit_score(),
        income in prop::option::of(0i64..=10_000_000_000),
        card_category in any_category(),
        annual_fee in 0i64..=1_000_000,
    ) {
        let c = make_card(card_category, annual_fee);
        let matching = make_profile(credit_score, Some(card_category), income);
        let unset = make_profile(credit_score, None, income);
        prop_assert!(score_card(&matching, &c).0 >= score_card(&unset, &c).0);
    }

    #[test]
    fn reason_payload_reflects_inputs(
        credit_score in any_credit_score(),
        profile_category in prop::option::of(any_category()),
        income in prop::option::of(0i64..=10_000_000_000),
        card_category in any_category(),
        annual_fee in 0i64..=1_000_000,
    ) {
        let p = make_profile(credit_score, profile_category, income);
        let c = make_card(card_category, annual_fee);
        let (_, reason) = score_card(&p, &c);
        prop_assert_eq!(reason.credit_score, credit_score);
        prop_assert_eq!(reason.income, income);
        prop_assert_eq!(reason.category_match, profile_category == Some(card_category));
    }
}
