//! This mod is meant to hold most of the code for the library's leader-facing API.
mod handle;
mod options;
mod wiring;

pub use handle::LeaderHandle;
pub use options::LeaderOptions;
pub use wiring::try_create_leader;
pub use wiring::LeaderConfig;
pub use wiring::LeaderCreationError;
