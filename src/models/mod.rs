pub mod answers;
pub mod candidate;
pub mod likes;
pub mod matches;
pub mod questions;
pub mod users;

pub use answers::{AnswerRow, AnswerSet, Selection};
pub use candidate::CandidateRow;
pub use likes::{LikeRow, LikedUserRow};
pub use matches::{MatchRow, MatchedUserRow};
pub use questions::{Question, QuestionKind, QuestionOption, QuestionRow};
pub use users::{Gender, UsersRow};
