use std::collections::BTreeMap;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnswerRow {
    pub user_id: i64,
    pub question_id: i64,
    pub selection_json: String,
}

/// Selected option indices for one question. Single-choice and scale
/// questions hold exactly one index.
pub type Selection = Vec<i64>;

/// question id -> selection, for a single user.
pub type AnswerSet = BTreeMap<i64, Selection>;
