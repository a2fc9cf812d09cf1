use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::CandidateRow;

pub const SQL_CANDIDATES_BASE: &str = r#"
SELECT
    u.id, u.username, u.full_name, u.photo_url, u.has_apartment,
    u.city, u.district, u.age, u.gender, u.budget_min, u.budget_max,
    u.bio, u.apartment_description
FROM users u
WHERE u.id != "#;

/// Hard filters, already validated and resolved against the requester.
#[derive(Debug, Clone, Default)]
pub struct CandidateQuery<'a> {
    pub gender: Option<&'a str>,
    pub city: Option<&'a str>,
    pub district: Option<&'a str>,
    pub age_min: Option<i64>,
    pub age_max: Option<i64>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub has_apartment: Option<bool>,
}

/// Every eligible candidate in ascending id order. No LIMIT here: the
/// result is capped only after ranking.
pub async fn load_candidates(
    pool: &SqlitePool,
    requester_id: i64,
    question_count: i64,
    query: &CandidateQuery<'_>,
) -> sqlx::Result<Vec<CandidateRow>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SQL_CANDIDATES_BASE);
    qb.push_bind(requester_id);

    // Completed questionnaire, counted against questions that still exist.
    qb.push(
        " AND (SELECT COUNT(*) FROM test_answers ta \
         JOIN test_questions q ON q.id = ta.question_id \
         WHERE ta.user_id = u.id) >= ",
    );
    qb.push_bind(question_count);

    if let Some(gender) = query.gender {
        qb.push(" AND u.gender = ").push_bind(gender);
    }
    if let Some(city) = query.city {
        qb.push(" AND u.city = ").push_bind(city);
    }
    if let Some(district) = query.district {
        qb.push(" AND u.district = ").push_bind(district);
    }
    if let Some(age_min) = query.age_min {
        qb.push(" AND u.age >= ").push_bind(age_min);
    }
    if let Some(age_max) = query.age_max {
        qb.push(" AND u.age <= ").push_bind(age_max);
    }
    if let Some(budget_min) = query.budget_min {
        qb.push(" AND (u.budget_min IS NULL OR u.budget_min >= ")
            .push_bind(budget_min)
            .push(")");
    }
    if let Some(budget_max) = query.budget_max {
        qb.push(" AND (u.budget_max IS NULL OR u.budget_max <= ")
            .push_bind(budget_max)
            .push(")");
    }
    if let Some(has_apartment) = query.has_apartment {
        qb.push(" AND u.has_apartment = ").push_bind(has_apartment);
    }

    qb.push(" ORDER BY u.id ASC");

    qb.build_query_as::<CandidateRow>().fetch_all(pool).await
}
