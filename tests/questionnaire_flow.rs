use roommates::database::question_repo::{self, NewQuestion};
use roommates::error::AppError;
use roommates::models::Gender;
use roommates::services::questionnaire_service::{
    self, AnswerSubmission, SelectionInput,
};
mod common;

#[tokio::test]
async fn resubmitting_an_answer_overwrites_it() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let user = common::create_user(pool, 1, Gender::Female, "Kazan").await;
    let questions = questionnaire_service::load_questions(pool).await.unwrap();
    let first = questions[0].id;

    questionnaire_service::save_answer(pool, user, first, &SelectionInput::One(1))
        .await
        .unwrap();
    questionnaire_service::save_answer(pool, user, first, &SelectionInput::One(3))
        .await
        .unwrap();

    let answers = questionnaire_service::load_answer_set(pool, user).await.unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers.get(&first), Some(&vec![3]));
}

#[tokio::test]
async fn unknown_question_and_bad_index_are_rejected() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let user = common::create_user(pool, 1, Gender::Female, "Kazan").await;
    let questions = questionnaire_service::load_questions(pool).await.unwrap();

    let missing =
        questionnaire_service::save_answer(pool, user, 9999, &SelectionInput::One(0)).await;
    assert!(matches!(missing, Err(AppError::QuestionNotFound(9999))));

    let out_of_range =
        questionnaire_service::save_answer(pool, user, questions[0].id, &SelectionInput::One(5))
            .await;
    assert!(matches!(out_of_range, Err(AppError::InvalidSelection(_))));

    let status = questionnaire_service::completion_status(pool, user).await.unwrap();
    assert_eq!(status.answered_count, 0);
}

#[tokio::test]
async fn invalid_submission_leaves_previous_answers_untouched() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let user = common::create_user(pool, 1, Gender::Male, "Kazan").await;
    common::answer_catalog(pool, user, &[2; 10]).await;

    let questions = questionnaire_service::load_questions(pool).await.unwrap();
    let broken = vec![
        AnswerSubmission {
            question_id: questions[0].id,
            selection: SelectionInput::One(0),
        },
        AnswerSubmission {
            question_id: questions[1].id,
            selection: SelectionInput::One(7),
        },
    ];
    let result = questionnaire_service::submit_answers(pool, user, &broken).await;
    assert!(matches!(result, Err(AppError::InvalidSelection(_))));

    let answers = questionnaire_service::load_answer_set(pool, user).await.unwrap();
    assert_eq!(answers.len(), 10);
    assert!(answers.values().all(|s| s == &vec![2]));
}

#[tokio::test]
async fn submission_replaces_the_whole_set() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let user = common::create_user(pool, 1, Gender::Male, "Kazan").await;
    common::answer_catalog(pool, user, &[2; 10]).await;
    assert!(questionnaire_service::is_complete(pool, user).await.unwrap());

    common::answer_catalog(pool, user, &[1, 1, 1]).await;
    let status = questionnaire_service::completion_status(pool, user).await.unwrap();
    assert_eq!(status.question_count, 10);
    assert_eq!(status.answered_count, 3);
    assert!(!status.is_completed);
}

#[tokio::test]
async fn duplicate_question_in_one_submission_is_rejected() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let user = common::create_user(pool, 1, Gender::Male, "Kazan").await;
    let questions = questionnaire_service::load_questions(pool).await.unwrap();
    let twice = vec![
        AnswerSubmission {
            question_id: questions[0].id,
            selection: SelectionInput::One(0),
        },
        AnswerSubmission {
            question_id: questions[0].id,
            selection: SelectionInput::One(1),
        },
    ];
    let result = questionnaire_service::submit_answers(pool, user, &twice).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn reset_clears_completion() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let user = common::create_user(pool, 1, Gender::Other, "Kazan").await;
    common::answer_catalog(pool, user, &[4; 10]).await;

    let removed = questionnaire_service::reset_answers(pool, user).await.unwrap();
    assert_eq!(removed, 10);
    assert!(!questionnaire_service::is_complete(pool, user).await.unwrap());
}

#[tokio::test]
async fn multiple_choice_questions_take_a_set() {
    let ctx = common::init_test_db().await;
    let pool = &ctx.pool;
    let user = common::create_user(pool, 1, Gender::Female, "Kazan").await;
    let hobbies = question_repo::insert_question(
        pool,
        NewQuestion {
            position: 11,
            title: "Which of these do you do at home?",
            kind: "multiple",
            answers_json: r#"["Cook","Host guests","Play music","Work remotely"]"#,
        },
    )
    .await
    .unwrap();

    questionnaire_service::save_answer(pool, user, hobbies, &SelectionInput::Many(vec![3, 0, 3]))
        .await
        .unwrap();
    let answers = questionnaire_service::load_answer_set(pool, user).await.unwrap();
    assert_eq!(answers.get(&hobbies), Some(&vec![0, 3]));

    // The catalog grew, so ten answers no longer complete it.
    common::answer_catalog(pool, user, &[2; 10]).await;
    let status = questionnaire_service::completion_status(pool, user).await.unwrap();
    assert_eq!(status.question_count, 11);
    assert!(!status.is_completed);
}
