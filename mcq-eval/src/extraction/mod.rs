//! Gold and predicted letter extraction

pub mod fields;
pub mod letters;
pub mod normalize;

pub use fields::{CandidateAnswer, FieldSelector};
pub use letters::{LetterExtractor, MatchRule};
pub use normalize::{collapse_whitespace, norm, preview};
