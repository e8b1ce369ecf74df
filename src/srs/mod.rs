pub mod algorithm;
pub mod engine;
pub mod error;
pub mod quality;
pub mod session;

pub use algorithm::SrsState;
pub use engine::SrsEngine;
pub use error::ReviewError;
pub use quality::{Quality, SelfRating};
pub use session::{DeckEntry, Phase, ReviewSession};
