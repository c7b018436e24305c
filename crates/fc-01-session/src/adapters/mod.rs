//! Adapters Layer: concrete storage, clock and navigator implementations.

pub mod clock;
pub mod file;
pub mod memory;

pub use clock::{FixedClock, SystemClock};
pub use file::FileClientStorage;
pub use memory::{InMemoryClientStorage, RecordingNavigator};
