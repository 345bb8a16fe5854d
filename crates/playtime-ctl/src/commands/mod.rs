pub mod allow;
pub mod limit;
pub mod pin;
pub mod schedule;
pub mod sessions;
pub mod status;

use std::sync::Arc;

use anyhow::{bail, Result};
use secrecy::SecretString;

use playtime_common::types::{ParentToken, PinVerification};
use playtime_engine::OverrideAuthority;
use playtime_store::{Database, DatabaseConfig};

use crate::config::CtlConfig;

pub(crate) async fn open_database() -> Result<Arc<Database>> {
    let config = CtlConfig::load()?;
    let db = Database::open(DatabaseConfig { path: config.database_path }).await?;
    Ok(Arc::new(db))
}

fn prompt_pin() -> Result<SecretString> {
    let pin = rpassword::prompt_password("Parent PIN: ")?;
    Ok(SecretString::new(pin.into()))
}

/// Require a successful PIN check. Overrides always pass through here.
pub(crate) async fn authorize(authority: &OverrideAuthority) -> Result<ParentToken> {
    match authority.verify_pin(&prompt_pin()?).await? {
        PinVerification::Success(token) => Ok(token),
        PinVerification::Failure => bail!("Incorrect PIN"),
        PinVerification::NotSet => {
            bail!("No parent PIN is set. Run `playtime-ctl pin set` first")
        }
    }
}

/// Gate a settings change behind the PIN when one exists. Before a PIN is
/// configured the settings remain reachable so initial setup can happen.
pub(crate) async fn authorize_settings(
    db: &Database,
    authority: &OverrideAuthority,
) -> Result<()> {
    use playtime_store::SettingsQueries;

    if SettingsQueries::pin_hash(db).await?.is_none() {
        return Ok(());
    }

    match authority.verify_pin(&prompt_pin()?).await? {
        PinVerification::Success(_) => Ok(()),
        PinVerification::Failure => bail!("Incorrect PIN"),
        PinVerification::NotSet => Ok(()),
    }
}
