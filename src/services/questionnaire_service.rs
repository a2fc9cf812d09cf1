use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::database::{answer_repo, question_repo, with_retry};
use crate::error::{AppError, AppResult};
use crate::models::{AnswerRow, AnswerSet, Question, QuestionKind, QuestionOption, QuestionRow, Selection};

/// A selection as it arrives on the wire: a bare index for single-choice
/// and scale questions, a list for multiple choice.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SelectionInput {
    One(i64),
    Many(Vec<i64>),
}

impl SelectionInput {
    fn indices(&self) -> Vec<i64> {
        match self {
            SelectionInput::One(i) => vec![*i],
            SelectionInput::Many(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerSubmission {
    pub question_id: i64,
    pub selection: SelectionInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveAnswerRequest {
    pub selection: SelectionInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<AnswerSubmission>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompletionStatus {
    #[serde(rename = "questionCount")]
    pub question_count: i64,
    #[serde(rename = "answeredCount")]
    pub answered_count: i64,
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
}

fn question_from_row(row: QuestionRow) -> AppResult<Question> {
    let kind = QuestionKind::parse(&row.kind).ok_or_else(|| {
        AppError::Internal(format!("question {} has unknown kind {}", row.id, row.kind))
    })?;
    let labels: Vec<String> = serde_json::from_str(&row.answers_json)?;
    Ok(Question {
        id: row.id,
        position: row.position,
        title: row.title,
        kind,
        answers: labels
            .into_iter()
            .enumerate()
            .map(|(idx, text)| QuestionOption {
                id: idx as i64,
                text,
            })
            .collect(),
    })
}

/// The catalog in position order.
pub async fn load_questions(pool: &SqlitePool) -> AppResult<Vec<Question>> {
    question_repo::list_questions(pool)
        .await?
        .into_iter()
        .map(question_from_row)
        .collect()
}

pub async fn load_answer_set(pool: &SqlitePool, user_id: i64) -> AppResult<AnswerSet> {
    let rows = answer_repo::load_answers(pool, user_id).await?;
    let mut grouped = group_answers(rows)?;
    Ok(grouped.remove(&user_id).unwrap_or_default())
}

/// Answer sets for many users at once, keyed by user id. Users without
/// answers are absent from the map.
pub async fn load_answer_sets(
    pool: &SqlitePool,
    user_ids: &[i64],
) -> AppResult<HashMap<i64, AnswerSet>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = answer_repo::load_answers_for_users(pool, user_ids).await?;
    group_answers(rows)
}

fn group_answers(rows: Vec<AnswerRow>) -> AppResult<HashMap<i64, AnswerSet>> {
    let mut grouped: HashMap<i64, AnswerSet> = HashMap::new();
    for row in rows {
        let selection: Selection = serde_json::from_str(&row.selection_json)?;
        grouped
            .entry(row.user_id)
            .or_default()
            .insert(row.question_id, selection);
    }
    Ok(grouped)
}

/// Checks the selection against the question's kind and option range and
/// returns it normalized (multiple choice sorted and de-duplicated).
pub fn validate_selection(question: &Question, input: &SelectionInput) -> AppResult<Selection> {
    let indices = input.indices();
    let option_count = question.option_count() as i64;

    if let Some(bad) = indices.iter().find(|i| **i < 0 || **i >= option_count) {
        return Err(AppError::InvalidSelection(format!(
            "option {} is out of range for question {} ({} options)",
            bad, question.id, option_count
        )));
    }

    match question.kind {
        QuestionKind::Single | QuestionKind::Scale => {
            if indices.len() != 1 {
                return Err(AppError::InvalidSelection(format!(
                    "question {} takes exactly one option",
                    question.id
                )));
            }
            Ok(indices)
        }
        QuestionKind::Multiple => {
            let unique: BTreeSet<i64> = indices.into_iter().collect();
            if unique.is_empty() {
                return Err(AppError::InvalidSelection(format!(
                    "question {} needs at least one option",
                    question.id
                )));
            }
            Ok(unique.into_iter().collect())
        }
    }
}

/// Stores one answer, replacing any earlier answer to the same question.
pub async fn save_answer(
    pool: &SqlitePool,
    user_id: i64,
    question_id: i64,
    input: &SelectionInput,
) -> AppResult<()> {
    let row = question_repo::load_question(pool, question_id)
        .await?
        .ok_or(AppError::QuestionNotFound(question_id))?;
    let question = question_from_row(row)?;
    let selection = validate_selection(&question, input)?;
    let selection_json = serde_json::to_string(&selection)?;
    let selection_json = selection_json.as_str();

    with_retry("save_answer", move || async move {
        let mut tx = pool.begin().await?;
        answer_repo::upsert_answer(&mut tx, user_id, question_id, selection_json).await?;
        tx.commit().await?;
        Ok::<_, AppError>(())
    })
    .await?;

    info!(user_id, question_id, "answer_saved");
    Ok(())
}

/// Replaces the user's whole answer set. Every answer is validated before
/// anything is written; the delete and the inserts commit together.
pub async fn submit_answers(
    pool: &SqlitePool,
    user_id: i64,
    answers: &[AnswerSubmission],
) -> AppResult<usize> {
    let questions: HashMap<i64, Question> = load_questions(pool)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    let mut seen = HashSet::new();
    let mut validated: Vec<(i64, String)> = Vec::with_capacity(answers.len());
    for answer in answers {
        let question = questions
            .get(&answer.question_id)
            .ok_or(AppError::QuestionNotFound(answer.question_id))?;
        if !seen.insert(answer.question_id) {
            return Err(AppError::Validation(format!(
                "question {} is answered more than once",
                answer.question_id
            )));
        }
        let selection = validate_selection(question, &answer.selection)?;
        validated.push((answer.question_id, serde_json::to_string(&selection)?));
    }
    let validated = &validated;

    with_retry("submit_answers", move || async move {
        let mut tx = pool.begin().await?;
        answer_repo::delete_answers(&mut tx, user_id).await?;
        for (question_id, selection_json) in validated {
            answer_repo::upsert_answer(&mut tx, user_id, *question_id, selection_json).await?;
        }
        tx.commit().await?;
        Ok::<_, AppError>(())
    })
    .await?;

    info!(user_id, inserted = validated.len(), "answers_submitted");
    Ok(validated.len())
}

pub async fn completion_status(pool: &SqlitePool, user_id: i64) -> AppResult<CompletionStatus> {
    let question_count = question_repo::count_questions(pool).await?;
    let answered_count = answer_repo::count_answers(pool, user_id).await?;
    Ok(CompletionStatus {
        question_count,
        answered_count,
        is_completed: question_count > 0 && answered_count >= question_count,
    })
}

pub async fn is_complete(pool: &SqlitePool, user_id: i64) -> AppResult<bool> {
    Ok(completion_status(pool, user_id).await?.is_completed)
}

pub async fn reset_answers(pool: &SqlitePool, user_id: i64) -> AppResult<u64> {
    let removed = with_retry("reset_answers", move || async move {
        let mut tx = pool.begin().await?;
        let removed = answer_repo::delete_answers(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok::<_, AppError>(removed)
    })
    .await?;
    info!(user_id, removed, "answers_reset");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: QuestionKind, options: usize) -> Question {
        Question {
            id: 1,
            position: 1,
            title: "q".into(),
            kind,
            answers: (0..options as i64)
                .map(|id| QuestionOption {
                    id,
                    text: id.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn scale_takes_one_index_in_range() {
        let q = question(QuestionKind::Scale, 5);
        assert_eq!(validate_selection(&q, &SelectionInput::One(4)).unwrap(), vec![4]);
        assert!(matches!(
            validate_selection(&q, &SelectionInput::One(5)),
            Err(AppError::InvalidSelection(_))
        ));
        assert!(matches!(
            validate_selection(&q, &SelectionInput::One(-1)),
            Err(AppError::InvalidSelection(_))
        ));
        assert!(matches!(
            validate_selection(&q, &SelectionInput::Many(vec![1, 2])),
            Err(AppError::InvalidSelection(_))
        ));
    }

    #[test]
    fn multiple_choice_is_normalized() {
        let q = question(QuestionKind::Multiple, 4);
        assert_eq!(
            validate_selection(&q, &SelectionInput::Many(vec![3, 1, 3])).unwrap(),
            vec![1, 3]
        );
        assert!(matches!(
            validate_selection(&q, &SelectionInput::Many(vec![])),
            Err(AppError::InvalidSelection(_))
        ));
    }

    #[test]
    fn selection_accepts_number_or_list() {
        let one: AnswerSubmission =
            serde_json::from_str(r#"{"question_id": 3, "selection": 2}"#).unwrap();
        assert_eq!(one.selection, SelectionInput::One(2));
        let many: AnswerSubmission =
            serde_json::from_str(r#"{"question_id": 3, "selection": [0, 2]}"#).unwrap();
        assert_eq!(many.selection, SelectionInput::Many(vec![0, 2]));
        assert!(serde_json::from_str::<AnswerSubmission>(
            r#"{"question_id": 3, "selection": 2, "extra": true}"#
        )
        .is_err());
    }
}
