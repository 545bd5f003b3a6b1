pub mod core;
pub mod engine;
pub mod puzzle;
pub mod rewards;
pub mod store;
mod ws;
mod ws_handler;

pub use self::core::messages;
pub use self::core::{Lexicon, RelationKind, WordRepository};
pub use engine::{RushRegistry, RushTimings};
pub use ws::run_connection;
pub use ws_handler::{Audience, RushState};
