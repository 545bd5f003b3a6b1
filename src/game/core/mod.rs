pub mod lexicon;
pub mod messages;
pub mod round;
pub mod session;
mod word_repository;

pub use lexicon::{Lexicon, RelationKind};
pub use word_repository::WordRepository;
