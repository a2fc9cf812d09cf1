use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::SqlitePool;
use tracing::info;

use crate::database::user_repo::{self, SeedUser};
use crate::database::{answer_repo, with_retry};
use crate::error::{AppError, AppResult};
use crate::models::Question;
use crate::services::questionnaire_service;

pub const DEMO_USERS: [SeedUser<'static>; 7] = [
    SeedUser {
        external_id: 1001,
        username: "anna_kazan",
        full_name: "Anna Petrova",
        photo_url: "https://images.unsplash.com/photo-1494790108755-2616b612b47c?w=400&h=400&fit=crop&crop=face",
        has_apartment: false,
        city: "Kazan",
        district: Some("Vakhitovsky"),
        age: 23,
        gender: "female",
        budget_min: Some(15000),
        budget_max: Some(25000),
        bio: "Psychology student at the federal university. Looking for a flatmate to share a place in the city centre. I like reading, cooking and films.",
        apartment_description: None,
    },
    SeedUser {
        external_id: 1002,
        username: "dmitriy_tech",
        full_name: "Dmitriy Sokolov",
        photo_url: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=400&h=400&fit=crop&crop=face",
        has_apartment: true,
        city: "Kazan",
        district: Some("Novo-Savinovsky"),
        age: 28,
        gender: "male",
        budget_min: None,
        budget_max: None,
        bio: "Software developer with a two-room flat in a new building. Looking for someone to split the bills. Remote worker, non-smoker.",
        apartment_description: Some("Spacious 65 m2 two-room flat, modern renovation, balcony, parking and security. The spare room is 18 m2 with a large window. Shopping centre and metro nearby."),
    },
    SeedUser {
        external_id: 1003,
        username: "maria_student",
        full_name: "Maria Ivanova",
        photo_url: "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?w=400&h=400&fit=crop&crop=face",
        has_apartment: false,
        city: "Kazan",
        district: Some("Sovetsky"),
        age: 21,
        gender: "female",
        budget_min: Some(12000),
        budget_max: Some(20000),
        bio: "Medical student. Serious about studying but likes to have fun in free time. Looking for a female flatmate.",
        apartment_description: None,
    },
    SeedUser {
        external_id: 1004,
        username: "alex_moscow",
        full_name: "Alexander Volkov",
        photo_url: "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=400&h=400&fit=crop&crop=face",
        has_apartment: false,
        city: "Moscow",
        district: None,
        age: 26,
        gender: "male",
        budget_min: Some(30000),
        budget_max: Some(50000),
        bio: "Marketer, moved to Moscow for work. Looking for a flat and a flatmate near the metro. Into sports, easygoing, keeps things tidy.",
        apartment_description: None,
    },
    SeedUser {
        external_id: 1005,
        username: "elena_design",
        full_name: "Elena Smirnova",
        photo_url: "https://images.unsplash.com/photo-1544005313-94ddf0286df2?w=400&h=400&fit=crop&crop=face",
        has_apartment: true,
        city: "Saint Petersburg",
        district: None,
        age: 25,
        gender: "female",
        budget_min: None,
        budget_max: None,
        bio: "Freelance graphic designer with a cosy flat in the historic centre. Looking for a creative flatmate who loves art and the city.",
        apartment_description: Some("Three-room flat in an old building on the Petrogradsky side. High ceilings, parquet floors, a studio for creative work. The room for rent is 20 m2 with a river view."),
    },
    SeedUser {
        external_id: 1006,
        username: "ivan_student",
        full_name: "Ivan Morozov",
        photo_url: "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=400&h=400&fit=crop&crop=face",
        has_apartment: false,
        city: "Kazan",
        district: Some("Aviastroitelny"),
        age: 22,
        gender: "male",
        budget_min: Some(10000),
        budget_max: Some(18000),
        bio: "Aerospace engineering student. Quiet, top of the class. Looking for an equally serious flatmate.",
        apartment_description: None,
    },
    SeedUser {
        external_id: 1007,
        username: "oksana_teacher",
        full_name: "Oksana Belova",
        photo_url: "https://images.unsplash.com/photo-1534528741775-53994a69daeb?w=400&h=400&fit=crop&crop=face",
        has_apartment: true,
        city: "Yekaterinburg",
        district: None,
        age: 29,
        gender: "female",
        budget_min: None,
        budget_max: None,
        bio: "English teacher with a roomy flat next to the school. Looking for a responsible female flatmate, ideally also in education.",
        apartment_description: Some("Two-room flat in a quiet area, ten minutes' walk from the centre. Furnished 16 m2 room with a desk. Tidy, calm, lots of books."),
    },
];

/// Base answer profiles for the ten Likert questions, one index per
/// position.
pub const PERSONALITY_PROFILES: [[i64; 10]; 20] = [
    [4, 1, 4, 2, 4, 4, 3, 2, 4, 1], // outgoing, organized, open
    [2, 2, 3, 1, 2, 3, 1, 4, 2, 1], // introvert, kind, emotional
    [4, 1, 2, 3, 2, 4, 3, 2, 2, 3], // outgoing, critical, stable
    [3, 2, 4, 2, 1, 3, 1, 3, 3, 2], // balanced, responsible
    [4, 0, 3, 2, 3, 4, 4, 2, 1, 4], // outgoing, spontaneous
    [2, 1, 4, 1, 1, 3, 1, 4, 4, 1], // introvert, disciplined
    [1, 3, 2, 4, 2, 2, 2, 3, 3, 2], // introvert, anxious
    [4, 2, 4, 1, 4, 1, 4, 1, 4, 2], // outgoing, responsible, stable
    [3, 1, 3, 3, 3, 3, 2, 2, 2, 3], // balanced
    [2, 4, 1, 4, 1, 2, 1, 4, 1, 4], // introvert, critical, conservative
    [4, 0, 4, 1, 4, 4, 4, 1, 4, 0], // very open and sociable
    [1, 3, 2, 4, 2, 1, 2, 3, 2, 3], // reserved, anxious
    [3, 2, 3, 2, 3, 3, 3, 2, 3, 2], // middle of the road
    [4, 1, 4, 0, 3, 4, 4, 2, 4, 1], // outgoing, stable, open
    [2, 2, 2, 3, 2, 2, 1, 3, 2, 3], // introvert, restrained
    [4, 0, 3, 1, 4, 3, 4, 1, 3, 2], // outgoing, curious
    [1, 4, 1, 4, 1, 1, 1, 4, 1, 4], // very introverted, critical
    [3, 1, 4, 2, 3, 2, 3, 2, 3, 2], // balanced, responsible
    [4, 2, 4, 3, 2, 4, 4, 3, 2, 3], // outgoing, a little anxious
    [2, 1, 2, 2, 4, 2, 2, 2, 3, 1], // introvert, open to experience
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub answers: usize,
}

/// Picks a base profile and nudges every answer by -1, 0 or +1, staying
/// within each question's option range.
pub fn generate_answers<R: Rng>(rng: &mut R, questions: &[Question]) -> Vec<(i64, i64)> {
    let base = &PERSONALITY_PROFILES[rng.gen_range(0..PERSONALITY_PROFILES.len())];
    questions
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let anchor = base.get(idx).copied().unwrap_or(2);
            let top = (question.option_count() as i64 - 1).max(0);
            let jitter: i64 = rng.gen_range(-1..=1);
            (question.id, (anchor + jitter).clamp(0, top))
        })
        .collect()
}

/// Wipes every user and loads the demo users with questionnaire answers.
/// The same `seed` always yields the same answers.
pub async fn reset_demo_data(pool: &SqlitePool, seed: u64) -> AppResult<SeedReport> {
    let questions = questionnaire_service::load_questions(pool).await?;
    let questions = questions.as_slice();

    let report = with_retry("reset_demo_data", move || async move {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tx = pool.begin().await?;
        user_repo::delete_all_users(&mut tx).await?;

        let mut answers = 0;
        for user in DEMO_USERS.iter() {
            let user_id = user_repo::insert_seed_user(&mut tx, user).await?;
            for (question_id, index) in generate_answers(&mut rng, questions) {
                let selection_json = serde_json::to_string(&[index])?;
                answer_repo::upsert_answer(&mut tx, user_id, question_id, &selection_json).await?;
                answers += 1;
            }
        }

        tx.commit().await?;
        Ok::<_, AppError>(SeedReport {
            users: DEMO_USERS.len(),
            answers,
        })
    })
    .await?;

    info!(users = report.users, answers = report.answers, seed, "demo_data_reset");
    Ok(report)
}
