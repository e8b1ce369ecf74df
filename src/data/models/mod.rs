pub mod auth_models;
pub mod catalog_models;
pub mod progress_models;
pub mod review_models;
pub mod search_models;
pub mod user_models;

pub use auth_models::{LoginError, LoginForm, RegisterError, RegisterForm};
pub use catalog_models::{
    ApiResponse, CreateItemRequest, CreateLessonRequest, Item, KIND_FLASHCARD, KIND_QUESTION,
    Lesson, LessonWithItems, NewItem,
};
pub use progress_models::LessonProgress;
pub use review_models::{
    AnswerOutcome, AnswerRequest, CardView, DueQuery, DueReview, RateRequest, ReviewState,
    StartStudyRequest, StudyView,
};
pub use search_models::{SearchHit, SearchParams, SearchResult};
pub use user_models::{NewUser, User};
