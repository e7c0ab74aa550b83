pub mod activity_repository;
pub mod answer_repository;
pub mod question_repository;
pub mod user_repository;

pub use activity_repository::*;
pub use answer_repository::*;
pub use question_repository::*;
pub use user_repository::*;
