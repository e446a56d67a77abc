//! Session setup: profile → logged-in client → coordinator.

use std::sync::Arc;

use tracing::debug;

use homesafe_config::{self as config, Config, Profile};
use homesafe_core::{Coordinator, CoreError, HomesafeClient};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub type FleetCoordinator = Coordinator<HomesafeClient>;

/// Resolve the active profile, authenticate, and build a coordinator.
///
/// Without a matching profile, an account given entirely through
/// `HOMESAFE_EMAIL` / `HOMESAFE_PASSWORD` is still accepted.
pub async fn connect(global: &GlobalOpts, cfg: &Config) -> Result<FleetCoordinator, CliError> {
    let (name, profile) = match cfg.profile(global.profile.as_deref()) {
        Ok((name, profile)) => (name.to_owned(), profile.clone()),
        Err(_) if std::env::var("HOMESAFE_EMAIL").is_ok() => {
            let name = global.profile.clone().unwrap_or_else(|| "default".into());
            (name, Profile::default())
        }
        Err(e) => return Err(e.into()),
    };

    let transport = config::profile_to_transport_config(&profile, &cfg.defaults)?;
    let client = HomesafeClient::new(&transport).map_err(CoreError::from)?;

    if profile.cookies.is_empty() {
        let email = config::resolve_email(&profile, &name)?;
        let password = config::resolve_password(&profile, &name)?;
        client
            .login(&email, &password)
            .await
            .map_err(|e| for_profile(CoreError::from(e).into(), &name))?;
        debug!(profile = %name, "logged in");
    } else {
        client.seed_cookies(&profile.cookies);
        debug!(profile = %name, "using captured session cookies");
    }

    let coordinator_config =
        config::profile_to_coordinator_config(&profile, &cfg.defaults, global.interval);
    Ok(Coordinator::new(coordinator_config, Arc::new(client)))
}

/// Attach the profile name to auth failures so the help text is specific.
fn for_profile(err: CliError, name: &str) -> CliError {
    match err {
        CliError::AuthFailed { message, .. } => CliError::AuthFailed {
            profile: name.into(),
            message,
        },
        other => other,
    }
}
