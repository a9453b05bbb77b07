use crate::api;
use crate::cli::actions::Action;
use anyhow::Result;
use std::time::Duration;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            session_ttl_seconds,
        } => {
            api::new(port, dsn, Duration::from_secs(session_ttl_seconds)).await?;
        }
    }

    Ok(())
}
