use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SearchHit {
    pub item_id: i32,
    pub lesson_id: i32,
    pub kind: String,
    pub prompt: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub results: Vec<SearchHit>,
}
