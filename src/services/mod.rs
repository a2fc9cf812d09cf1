pub mod clock;
pub mod compatibility;
pub mod like_service;
pub mod questionnaire_service;
pub mod search_service;
pub mod seed_service;
pub mod user_service;
