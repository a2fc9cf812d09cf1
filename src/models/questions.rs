use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub position: i64,
    pub title: String,
    pub kind: String,
    pub answers_json: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Single,
    Multiple,
    Scale,
}

impl QuestionKind {
    pub fn parse(raw: &str) -> Option<QuestionKind> {
        match raw {
            "single" => Some(QuestionKind::Single),
            "multiple" => Some(QuestionKind::Multiple),
            "scale" => Some(QuestionKind::Scale),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionOption {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: i64,
    pub position: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub answers: Vec<QuestionOption>,
}

impl Question {
    pub fn option_count(&self) -> usize {
        self.answers.len()
    }
}
