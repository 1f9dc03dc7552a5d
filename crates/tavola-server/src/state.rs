//! Shared application state handed to every handler.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tavola_core::TvResult;

use crate::approval::PendingLoginRegistry;
use crate::config::Config;
use crate::email::Mailer;
use crate::hub::Hub;
use crate::store::Store;
use crate::verification::CodeRegistry;

/// Account details parked while a manual signup awaits its emailed code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupPayload {
    pub name: String,
    pub password: String,
}

/// Account details parked while a Google signup awaits its emailed code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSignupPayload {
    pub name: String,
}

pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub hub: Hub,
    pub pending_logins: PendingLoginRegistry,
    pub signup_codes: CodeRegistry<SignupPayload>,
    pub google_codes: CodeRegistry<GoogleSignupPayload>,
    pub reset_codes: CodeRegistry<()>,
    pub mailer: Mailer,
}

impl AppState {
    pub async fn new(config: Config) -> TvResult<Arc<Self>> {
        let store = Store::connect(&config.database_url).await?;
        let mailer = Mailer::from_config(&config.smtp)?;
        let code_ttl = Duration::from_secs(config.code_ttl_secs);
        Ok(Arc::new(Self {
            config,
            store,
            hub: Hub::new(),
            pending_logins: PendingLoginRegistry::new(),
            signup_codes: CodeRegistry::new(code_ttl),
            google_codes: CodeRegistry::new(code_ttl),
            reset_codes: CodeRegistry::new(code_ttl),
            mailer,
        }))
    }

    pub fn approval_ttl(&self) -> Duration {
        Duration::from_secs(self.config.approval_ttl_secs)
    }
}
