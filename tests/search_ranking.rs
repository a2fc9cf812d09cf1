use roommates::config::{GenderPolicy, Settings};
use roommates::error::AppError;
use roommates::models::Gender;
use roommates::services::search_service::{self, SearchFilters};
use roommates::services::user_service::{self, ProfileUpdate};
mod common;

#[tokio::test]
async fn incomplete_requester_gets_test_required() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let me = common::create_user(pool, 1, Gender::Female, "Kazan").await;
    common::answer_catalog(pool, me, &[2; 9]).await;

    let result =
        search_service::search_candidates(pool, &Settings::default(), me, &SearchFilters::default())
            .await;
    assert!(matches!(result, Err(AppError::TestRequired)));
}

#[tokio::test]
async fn candidates_are_ranked_by_compatibility() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let me = common::create_user(pool, 1, Gender::Female, "Kazan").await;
    let far = common::create_user(pool, 2, Gender::Female, "Kazan").await;
    let twin = common::create_user(pool, 3, Gender::Female, "Kazan").await;
    let middle = common::create_user(pool, 4, Gender::Female, "Kazan").await;
    let unfinished = common::create_user(pool, 5, Gender::Female, "Kazan").await;
    common::answer_catalog(pool, me, &[0; 10]).await;
    common::answer_catalog(pool, far, &[4; 10]).await;
    common::answer_catalog(pool, twin, &[0; 10]).await;
    common::answer_catalog(pool, middle, &[3; 10]).await;
    common::answer_catalog(pool, unfinished, &[0; 4]).await;

    let results =
        search_service::search_candidates(pool, &Settings::default(), me, &SearchFilters::default())
            .await
            .unwrap();
    let ranked: Vec<(i64, Option<u8>)> =
        results.iter().map(|c| (c.id, c.compatibility)).collect();
    assert_eq!(
        ranked,
        vec![(twin, Some(100)), (middle, Some(46)), (far, Some(21))]
    );
}

#[tokio::test]
async fn gender_policy_and_override() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let me = common::create_user(pool, 1, Gender::Male, "Kazan").await;
    let man = common::create_user(pool, 2, Gender::Male, "Kazan").await;
    let woman = common::create_user(pool, 3, Gender::Female, "Kazan").await;
    for id in [me, man, woman] {
        common::answer_catalog(pool, id, &[2; 10]).await;
    }

    let ids = |rows: Vec<search_service::CandidateView>| -> Vec<i64> {
        rows.into_iter().map(|c| c.id).collect()
    };

    let same = search_service::search_candidates(pool, &Settings::default(), me, &SearchFilters::default())
        .await
        .unwrap();
    assert_eq!(ids(same), vec![man]);

    let opposite = Settings {
        gender_policy: GenderPolicy::Opposite,
        ..Settings::default()
    };
    let rows = search_service::search_candidates(pool, &opposite, me, &SearchFilters::default())
        .await
        .unwrap();
    assert_eq!(ids(rows), vec![woman]);

    let any = Settings {
        gender_policy: GenderPolicy::Any,
        ..Settings::default()
    };
    let rows = search_service::search_candidates(pool, &any, me, &SearchFilters::default())
        .await
        .unwrap();
    assert_eq!(ids(rows), vec![man, woman]);

    let filters = SearchFilters {
        gender: Some(Gender::Female),
        ..Default::default()
    };
    let rows = search_service::search_candidates(pool, &Settings::default(), me, &filters)
        .await
        .unwrap();
    assert_eq!(ids(rows), vec![woman]);
}

#[tokio::test]
async fn hard_filters_narrow_the_pool() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let me = common::create_user(pool, 1, Gender::Female, "Kazan").await;
    let owner = common::create_user(pool, 2, Gender::Female, "Kazan").await;
    let seeker = common::create_user(pool, 3, Gender::Female, "Kazan").await;
    let elsewhere = common::create_user(pool, 4, Gender::Female, "Moscow").await;
    for id in [me, owner, seeker, elsewhere] {
        common::answer_catalog(pool, id, &[1; 10]).await;
    }
    user_service::update_profile(
        pool,
        owner,
        &ProfileUpdate {
            has_apartment: Some(true),
            age: Some(31),
            apartment_description: Some("Two rooms, balcony".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    user_service::update_profile(
        pool,
        seeker,
        &ProfileUpdate {
            budget_min: Some(20000),
            budget_max: Some(30000),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let settings = Settings::default();
    let search = |filters: SearchFilters| async move {
        search_service::search_candidates(pool, &Settings::default(), me, &filters)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect::<Vec<i64>>()
    };

    assert_eq!(
        search(SearchFilters {
            city: Some("Kazan".into()),
            ..Default::default()
        })
        .await,
        vec![owner, seeker]
    );
    assert_eq!(
        search(SearchFilters {
            looking_for_apartment: Some(true),
            ..Default::default()
        })
        .await,
        vec![owner]
    );
    assert_eq!(
        search(SearchFilters {
            has_apartment: Some(false),
            budget_max: Some(25000),
            ..Default::default()
        })
        .await,
        vec![elsewhere]
    );
    assert_eq!(
        search(SearchFilters {
            age_min: Some(30),
            age_max: Some(35),
            ..Default::default()
        })
        .await,
        vec![owner]
    );

    let inverted = SearchFilters {
        age_min: Some(40),
        age_max: Some(30),
        ..Default::default()
    };
    let result = search_service::search_candidates(pool, &settings, me, &inverted).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn results_are_capped_after_ranking() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let me = common::create_user(pool, 1, Gender::Male, "Kazan").await;
    common::answer_catalog(pool, me, &[0; 10]).await;
    let mut by_score = Vec::new();
    for (external_id, value) in [(2, 4), (3, 3), (4, 0), (5, 1)] {
        let id = common::create_user(pool, external_id, Gender::Male, "Kazan").await;
        common::answer_catalog(pool, id, &[value; 10]).await;
        by_score.push((value, id));
    }

    let settings = Settings {
        search_limit: 2,
        ..Settings::default()
    };
    let results = search_service::search_candidates(pool, &settings, me, &SearchFilters::default())
        .await
        .unwrap();
    let ids: Vec<i64> = results.iter().map(|c| c.id).collect();
    // Identical answers first, then distance 1 everywhere.
    assert_eq!(ids, vec![by_score[2].1, by_score[3].1]);
}

#[tokio::test]
async fn empty_result_is_not_an_error() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let me = common::create_user(pool, 1, Gender::Other, "Kazan").await;
    common::answer_catalog(pool, me, &[2; 10]).await;
    let results = search_service::search_candidates(pool, &Settings::default(), me, &SearchFilters::default())
        .await
        .unwrap();
    assert!(results.is_empty());
}
