// View-model row for the search results (users + computed compatibility).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateRow {
    pub id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    pub has_apartment: bool,
    pub city: Option<String>,
    pub district: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub bio: Option<String>,
    pub apartment_description: Option<String>,
    #[sqlx(skip)]
    pub compatibility_percentage: Option<u8>,
}
