pub mod accumulator;
pub mod coordinator;
pub mod overrides;

pub use accumulator::UsageAccumulator;
pub use coordinator::{CoordinatorState, EngineConfig, PlaybackCoordinator, PlayerControl};
pub use overrides::OverrideAuthority;
