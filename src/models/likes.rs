#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LikeRow {
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub is_like: bool,
    pub created_at: String,
}

// A like joined with the profile on the other end of the edge.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LikedUserRow {
    pub id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    pub city: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub is_like: bool,
    pub created_at: String,
}
