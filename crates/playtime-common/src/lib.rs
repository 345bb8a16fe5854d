pub mod clock;
pub mod error;
pub mod limits;
pub mod schedule;
pub mod security;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use limits::{ensure_current_day, evaluate};
pub use schedule::is_within_window;
pub use security::{check_pin, PinManager};
pub use types::*;
