//! Command handlers

pub mod config;
pub mod user;

use anyhow::{anyhow, Result};

use userdir_core::{ApiError, Config, UserStore};

/// Build the store and load the collection
pub async fn open_store(config: &Config) -> Result<UserStore> {
    let mut store = UserStore::from_config(config)?;
    store.load_all().await.map_err(|e| with_hint(e, "Failed to load users"))?;
    Ok(store)
}

/// Turn an API failure into a message with a recovery hint
pub fn with_hint(error: ApiError, action: &str) -> anyhow::Error {
    let mut message = format!("{}: {}", action, error);
    if let Some(suggestion) = error.recovery_suggestion() {
        message.push_str(&format!("\n{}", suggestion));
    }
    if error.is_retryable() {
        message.push_str("\nRun the command again to retry.");
    }
    anyhow!(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_hint_for_retryable_error() {
        let err = with_hint(
            ApiError::Timeout {
                after: Duration::from_secs(10),
            },
            "Failed to load users",
        );
        let text = err.to_string();
        assert!(text.starts_with("Failed to load users: Request timed out. Please try again."));
        assert!(text.ends_with("Run the command again to retry."));
    }
}
