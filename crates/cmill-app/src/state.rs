//! Application state.
//!
//! Everything account-scoped lives behind one lock and is built and torn
//! down explicitly; there are no process-wide singletons to leak session
//! material between users.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use cmill_models::{PlanCatalog, Subscription, UsageSummary};
use cmill_processing::{ProcessingClient, ProgressChannel, StatusPoller};
use cmill_supabase::SupabaseClient;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// An authenticated session, issued by the external auth provider and
/// consumed opaquely here.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    /// Bearer token for the store; absent sessions fall back to anon access.
    pub access_token: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            access_token: None,
        }
    }

    /// Session material from the environment, if any is present.
    pub fn from_env() -> Option<Self> {
        let user_id = std::env::var("CMILL_USER_ID").ok()?;
        Some(Self {
            user_id,
            email: std::env::var("CMILL_USER_EMAIL").ok(),
            access_token: std::env::var("CMILL_ACCESS_TOKEN").ok(),
        })
    }
}

/// Account-scoped state, cleared wholesale on sign-out.
#[derive(Debug, Default)]
pub struct Account {
    pub session: Option<Session>,
    /// Cached subscription, refreshed by AccountService.
    pub subscription: Option<Subscription>,
    /// Last usage summary fetched; display-only, never used for gating.
    pub usage: Option<UsageSummary>,
}

/// Shared application state.
///
/// Built once at startup and handed around as `Arc`.
pub struct AppState {
    pub config: AppConfig,
    pub processing: ProcessingClient,
    pub poller: StatusPoller,
    /// Watch channel the poller publishes progress snapshots to.
    pub progress: Arc<ProgressChannel>,
    pub supabase: SupabaseClient,
    pub plans: PlanCatalog,
    pub account: RwLock<Account>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: AppConfig) -> AppResult<Arc<Self>> {
        let processing = ProcessingClient::new(config.processing.clone())?;
        let progress = Arc::new(ProgressChannel::new());
        let poller = StatusPoller::new(processing.clone(), config.poll.clone())
            .with_progress(Arc::clone(&progress));
        let supabase = SupabaseClient::new(config.supabase.clone())?;
        let plans = config.plans.clone();

        Ok(Arc::new(Self {
            config,
            processing,
            poller,
            progress,
            supabase,
            plans,
            account: RwLock::new(Account::default()),
        }))
    }

    /// Install a session and push its access token into the store client.
    pub async fn sign_in(&self, session: Session) {
        self.supabase
            .set_access_token(session.access_token.clone())
            .await;
        info!(user_id = %session.user_id, "Signed in");

        let mut account = self.account.write().await;
        account.session = Some(session);
        account.subscription = None;
        account.usage = None;
    }

    /// Tear down all account-scoped state: session, cached subscription,
    /// cached usage, and the store access token.
    pub async fn sign_out(&self) {
        self.supabase.set_access_token(None).await;

        let mut account = self.account.write().await;
        if let Some(session) = account.session.take() {
            info!(user_id = %session.user_id, "Signed out");
        }
        account.subscription = None;
        account.usage = None;
    }

    /// The current session, or `NotSignedIn`.
    pub async fn require_session(&self) -> AppResult<Session> {
        self.account
            .read()
            .await
            .session
            .clone()
            .ok_or(AppError::NotSignedIn)
    }

    pub async fn cache_subscription(&self, subscription: Subscription) {
        debug!(tier = %subscription.tier, "Caching subscription");
        self.account.write().await.subscription = Some(subscription);
    }

    pub async fn cache_usage(&self, usage: UsageSummary) {
        self.account.write().await.usage = Some(usage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmill_models::PlanTier;
    use cmill_supabase::{RetryConfig, SupabaseConfig};
    use std::time::Duration;

    fn test_state() -> Arc<AppState> {
        let config = AppConfig {
            processing: Default::default(),
            poll: Default::default(),
            supabase: SupabaseConfig {
                url: "https://abc.supabase.co".to_string(),
                anon_key: "anon".to_string(),
                timeout: Duration::from_secs(5),
                connect_timeout: Duration::from_secs(5),
                retry: RetryConfig::default(),
            },
            plans: PlanCatalog::default(),
            log_json: false,
        };
        AppState::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_require_session_when_signed_out() {
        let state = test_state();
        let err = state.require_session().await.unwrap_err();
        assert!(matches!(err, AppError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_sign_in_then_out_clears_account_state() {
        let state = test_state();

        let mut session = Session::new("user-1");
        session.access_token = Some("token".to_string());
        state.sign_in(session).await;

        state.cache_subscription(Subscription::default()).await;
        state
            .cache_usage(UsageSummary::new(PlanTier::Free, 1, 3))
            .await;

        assert_eq!(state.require_session().await.unwrap().user_id, "user-1");
        assert!(state.account.read().await.subscription.is_some());

        state.sign_out().await;

        let account = state.account.read().await;
        assert!(account.session.is_none());
        assert!(account.subscription.is_none());
        assert!(account.usage.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_resets_previous_users_caches() {
        let state = test_state();

        state.sign_in(Session::new("user-1")).await;
        state
            .cache_usage(UsageSummary::new(PlanTier::Pro, 50, 100))
            .await;

        state.sign_in(Session::new("user-2")).await;
        let account = state.account.read().await;
        assert_eq!(account.session.as_ref().unwrap().user_id, "user-2");
        assert!(account.usage.is_none());
    }
}
