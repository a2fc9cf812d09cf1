use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub id: i64,
    pub external_id: i64,
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
    pub created_at: String,
}

impl UsersRow {
    pub fn gender(&self) -> Option<Gender> {
        self.gender.as_deref().and_then(Gender::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Option<Gender> {
        match raw.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }

    /// `Other` has no opposite; it maps onto itself.
    pub fn opposite(self) -> Gender {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
            Gender::Other => Gender::Other,
        }
    }
}
