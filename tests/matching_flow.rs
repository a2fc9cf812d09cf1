use roommates::config::Settings;
use roommates::models::Gender;
use roommates::services::compatibility::ScoringVariant;
use roommates::services::like_service;
use roommates::services::search_service::{self, SearchFilters};
mod common;

#[tokio::test]
async fn ten_scale_questions_end_to_end() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let clock = common::fixed_clock();
    let settings = Settings::default();

    let me = common::create_user(pool, 1, Gender::Female, "Kazan").await;
    let twin = common::create_user(pool, 2, Gender::Female, "Kazan").await;
    let opposite = common::create_user(pool, 3, Gender::Female, "Kazan").await;
    common::answer_catalog(pool, me, &[2; 10]).await;
    common::answer_catalog(pool, twin, &[2; 10]).await;
    common::answer_catalog(pool, opposite, &[0; 10]).await;

    let ranked = search_service::search_candidates(pool, &settings, me, &SearchFilters::default())
        .await
        .unwrap();
    let scores: Vec<(i64, Option<u8>)> = ranked.iter().map(|c| (c.id, c.compatibility)).collect();
    assert_eq!(scores, vec![(twin, Some(100)), (opposite, Some(68))]);

    like_service::record_swipe(pool, &clock, me, opposite, true).await.unwrap();
    let swipe = like_service::record_swipe(pool, &clock, opposite, me, true).await.unwrap();
    assert!(swipe.is_match);

    let matches = like_service::list_matches(pool, &settings, opposite).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].user_id, me);
    assert_eq!(matches[0].compatibility, Some(68));
}

#[tokio::test]
async fn typed_scoring_is_linear_on_scales() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let settings = Settings {
        scoring_variant: ScoringVariant::Typed,
        ..Settings::default()
    };

    let me = common::create_user(pool, 1, Gender::Male, "Kazan").await;
    let other = common::create_user(pool, 2, Gender::Male, "Kazan").await;
    common::answer_catalog(pool, me, &[2; 10]).await;
    common::answer_catalog(pool, other, &[0; 10]).await;

    let pair = like_service::get_pairwise_compatibility(pool, &settings, me, other)
        .await
        .unwrap();
    assert_eq!(pair.compatibility, Some(50));
}
