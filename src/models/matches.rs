#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchRow {
    pub id: String,
    pub user_low_id: i64,
    pub user_high_id: i64,
    pub matched_at: String,
}

impl MatchRow {
    pub fn other_user(&self, user_id: i64) -> Option<i64> {
        if self.user_low_id == user_id {
            Some(self.user_high_id)
        } else if self.user_high_id == user_id {
            Some(self.user_low_id)
        } else {
            None
        }
    }
}

// View-model row for the matches list: the other user plus the most recent
// of the two like timestamps and the materialized match, when present.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchedUserRow {
    pub id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    pub city: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub match_id: Option<String>,
    pub matched_at: String,
}
