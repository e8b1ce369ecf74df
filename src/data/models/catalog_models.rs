use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::{items, lessons};

pub const KIND_QUESTION: &str = "question";
pub const KIND_FLASHCARD: &str = "flashcard";

/// A reviewable unit inside a lesson: a quiz question (with options) or a
/// flashcard (prompt + answer only). Content is display and grading data;
/// the scheduler only ever sees `item_id`.
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Item {
    pub item_id: i32,
    pub lesson_id: i32,
    pub kind: String,
    pub prompt: String,
    pub options: Option<String>,
    pub answer: String,
    pub added_at: NaiveDateTime,
}

impl Item {
    pub fn is_question(&self) -> bool {
        self.kind == KIND_QUESTION
    }

    /// Answer options as a list; stored as a JSON array, absent for
    /// flashcards.
    pub fn option_list(&self) -> Vec<String> {
        self.options
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    pub fn grade(&self, answer: &str) -> bool {
        self.answer.trim().eq_ignore_ascii_case(answer.trim())
    }
}

#[derive(Insertable)]
#[diesel(table_name = items)]
pub struct NewItem<'a> {
    pub lesson_id: i32,
    pub kind: &'a str,
    pub prompt: &'a str,
    pub options: Option<String>,
    pub answer: &'a str,
    pub added_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = lessons)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Lesson {
    pub lesson_id: i32,
    pub user_id: i32,
    pub title: String,
}

#[derive(Serialize)]
pub struct LessonWithItems {
    pub lesson_id: i32,
    pub title: String,
    pub items: Vec<Item>,
}

#[derive(Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 120, message = "Title must be 1-120 characters"))]
    pub title: String,
}

#[derive(Deserialize, Validate)]
pub struct CreateItemRequest {
    pub kind: String,
    #[validate(length(min = 1, message = "Prompt must not be empty"))]
    pub prompt: String,
    pub options: Option<Vec<String>>,
    #[validate(length(min = 1, message = "Answer must not be empty"))]
    pub answer: String,
}

/// Standard API response format
#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}
