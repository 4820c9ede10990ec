//! The process-wide default client.
//!
//! [`query`] and [`mutate`] delegate to a single [`Client`] that lives for the
//! rest of the process. It is configured at most once:
//!
//! - [`init`] installs a configured client, and must run before anything else
//!   touches the default client
//! - otherwise the first use installs a client with an empty configuration
//!
//! Clients built with [`create_kwery`](crate::create_kwery) are unaffected and
//! never share entries with the default client.

use std::sync::OnceLock;

use tracing::debug;

use crate::client::Client;
use crate::config::KweryConfig;
use crate::dispatch::{Kweries, Mutations};
use crate::error::KweryError;

static DEFAULT_CLIENT: OnceLock<Client> = OnceLock::new();

/// Installs the default client built from `config`.
///
/// # Errors
///
/// Returns [`KweryError::AlreadyInitialized`] if the default client already
/// exists, whether from an earlier `init` or from first use.
pub fn init(config: KweryConfig) -> Result<&'static Client, KweryError> {
    DEFAULT_CLIENT
        .set(Client::new(config))
        .map_err(|_| KweryError::AlreadyInitialized)?;

    debug!("Default client initialized");
    Ok(default_client())
}

/// Returns the default client, creating an unconfigured one on first use.
pub fn default_client() -> &'static Client {
    DEFAULT_CLIENT.get_or_init(Client::default)
}

/// Runs `selector` against the default client's queries.
pub fn query<T>(selector: impl FnOnce(&Kweries) -> T) -> T {
    default_client().query(selector)
}

/// Runs `selector` against the default client's mutations.
pub fn mutate<T>(selector: impl FnOnce(&Mutations) -> T) -> T {
    default_client().mutate(selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::create_kwery;
    use serde_json::json;

    #[test]
    fn test_default_client_is_stable_and_rejects_late_init() {
        let client = default_client();
        assert!(client.ptr_eq(default_client()));

        assert_eq!(
            init(KweryConfig::new()).map(|_| ()),
            Err(KweryError::AlreadyInitialized)
        );
    }

    #[test]
    fn test_explicit_clients_do_not_touch_default() {
        let client = create_kwery(KweryConfig::new().query_sync("local", |_| Ok(json!(1))));
        client.query(|k| k.get("local")).expect("query");

        assert!(!client.ptr_eq(default_client()));
        assert!(!default_client().is_cached("local", ()));
        assert!(query(|k| !k.contains("local")));
        assert!(mutate(|m| !m.contains("local")));
    }
}
