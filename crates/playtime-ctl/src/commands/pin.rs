use std::sync::Arc;

use anyhow::{bail, Result};
use secrecy::{ExposeSecret, SecretString};

use playtime_common::clock::SystemClock;
use playtime_common::types::PinVerification;
use playtime_engine::OverrideAuthority;
use playtime_store::SettingsQueries;

pub async fn set() -> Result<()> {
    let db = super::open_database().await?;
    let authority = OverrideAuthority::new(db.clone(), Arc::new(SystemClock));

    // Replacing an existing PIN requires knowing it.
    if SettingsQueries::pin_hash(&db).await?.is_some() {
        let current = SecretString::new(rpassword::prompt_password("Current PIN: ")?.into());
        match authority.verify_pin(&current).await? {
            PinVerification::Success(_) => {}
            PinVerification::Failure => bail!("Incorrect PIN"),
            PinVerification::NotSet => {}
        }
    }

    let new_pin = SecretString::new(rpassword::prompt_password("New PIN: ")?.into());
    let confirm = SecretString::new(rpassword::prompt_password("Confirm new PIN: ")?.into());

    if new_pin.expose_secret() != confirm.expose_secret() {
        bail!("PINs do not match");
    }
    if new_pin.expose_secret().len() < 4 {
        bail!("PIN must be at least 4 characters");
    }

    authority.set_pin(&new_pin).await?;
    println!("Parent PIN updated");
    Ok(())
}
