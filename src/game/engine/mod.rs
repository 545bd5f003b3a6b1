mod dispatcher;
mod presenter;
mod registry;
mod scheduler;
mod timings;

pub use dispatcher::{DEFAULT_QUEUE_CAPACITY, DispatchStats, RewardDispatcher, RewardJob};
pub use presenter::{Presenter, Silent};
pub use registry::{RushHandle, RushRegistry};
pub use scheduler::RoundDriver;
pub use timings::{DEFAULT_LOBBY_TIMEOUT, RushTimings};
