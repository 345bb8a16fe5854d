pub mod connection;
pub mod error;
pub mod migrations;
pub mod sessions;
pub mod settings;

pub use connection::{Database, DatabaseConfig};
pub use error::{Result, StoreError};
pub use sessions::{DbPlaybackSession, NewPlaybackSession, SessionQueries};
pub use settings::SettingsQueries;
