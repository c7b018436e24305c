//! Logout endpoint adapter for a headless client without an HTTP client.

use async_trait::async_trait;
use fc_01_session::Credential;
use fc_03_views::{AuthApi, FetchError};
use tracing::info;

/// Ends sessions locally only.
///
/// No request is sent: the server-side session lapses with the token. Logout
/// through this adapter always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalOnlyAuthApi;

#[async_trait]
impl AuthApi for LocalOnlyAuthApi {
    async fn logout(&self, _credential: &Credential) -> Result<(), FetchError> {
        info!("No server logout endpoint configured, ending session locally");
        Ok(())
    }
}
