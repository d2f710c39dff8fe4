// Identity providers and store selection
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use madhumeh_mitra_data::models::Identity;
use madhumeh_mitra_data::repository::{
    GuestLogStore, KeyValueStore, LogStoreTrait, PreferencesRepository, ProfileLogStore, RepositoryError,
};

/// Placeholder fragment left in unconfigured credentials
const PLACEHOLDER_MARKER: &str = "YOUR_";

/// Auth credentials as read from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub publishable_key: Option<String>,
    pub user_id: Option<String>,
}

impl AuthConfig {
    /// Whether a real (non-placeholder) key is configured
    pub fn is_configured(&self) -> bool {
        self.publishable_key
            .as_deref()
            .map(str::trim)
            .is_some_and(|key| !key.is_empty() && !key.contains(PLACEHOLDER_MARKER))
    }
}

/// Who is using the app
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// The identity stores are addressed by
    fn identity(&self) -> Identity;

    async fn sign_out(&self) -> Result<(), RepositoryError>;
}

/// Local, unauthenticated use
pub struct GuestIdentityProvider {
    preferences: PreferencesRepository<Arc<dyn KeyValueStore>>,
}

impl GuestIdentityProvider {
    pub fn new(local: Arc<dyn KeyValueStore>) -> Self {
        Self {
            preferences: PreferencesRepository::new(local),
        }
    }

    /// Record that the user chose guest mode on this device
    pub async fn enter(&self) -> Result<(), RepositoryError> {
        let mut prefs = self.preferences.load().await?;
        if !prefs.guest_mode {
            prefs.guest_mode = true;
            self.preferences.save(&prefs).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for GuestIdentityProvider {
    fn is_authenticated(&self) -> bool {
        false
    }

    fn identity(&self) -> Identity {
        Identity::Guest
    }

    async fn sign_out(&self) -> Result<(), RepositoryError> {
        let mut prefs = self.preferences.load().await?;
        prefs.guest_mode = false;
        self.preferences.save(&prefs).await?;
        info!("Left guest mode");
        Ok(())
    }
}

/// A signed-in user whose session was established by the auth service
pub struct AuthenticatedIdentityProvider {
    user_id: String,
    signed_in: AtomicBool,
}

impl AuthenticatedIdentityProvider {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            signed_in: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl IdentityProvider for AuthenticatedIdentityProvider {
    fn is_authenticated(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    fn identity(&self) -> Identity {
        if self.is_authenticated() {
            Identity::User(self.user_id.clone())
        } else {
            Identity::Guest
        }
    }

    async fn sign_out(&self) -> Result<(), RepositoryError> {
        self.signed_in.store(false, Ordering::SeqCst);
        info!("Signed out {}", self.user_id);
        Ok(())
    }
}

/// The provider chosen at startup and the store backing it
pub struct Session {
    pub provider: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn LogStoreTrait>,
    local: Arc<dyn KeyValueStore>,
}

impl Session {
    fn guest(local: Arc<dyn KeyValueStore>, provider: GuestIdentityProvider) -> Self {
        Self {
            provider: Arc::new(provider),
            store: Arc::new(GuestLogStore::new(Arc::clone(&local))),
            local,
        }
    }

    pub fn identity(&self) -> Identity {
        self.provider.identity()
    }

    /// End the current session.
    ///
    /// A signed-out user continues as a guest on the device-local store.
    /// Services built from the old store must be rebuilt.
    pub async fn sign_out(&mut self) -> Result<(), RepositoryError> {
        let was_user = self.provider.is_authenticated();
        self.provider.sign_out().await?;
        if was_user {
            let local = Arc::clone(&self.local);
            *self = Session::guest(Arc::clone(&local), GuestIdentityProvider::new(local));
            info!("Switched to the guest store after sign-out");
        }
        Ok(())
    }
}

/// Pick the identity provider and matching store.
///
/// Guest mode is used when auth is unconfigured or no user id is known.
pub async fn select_session(config: &AuthConfig, local: Arc<dyn KeyValueStore>) -> Session {
    let user_id = config
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    match user_id {
        Some(user_id) if config.is_configured() => {
            info!("Using authenticated identity for {}", user_id);
            Session {
                provider: Arc::new(AuthenticatedIdentityProvider::new(user_id)),
                store: Arc::new(ProfileLogStore::new(Arc::clone(&local))),
                local,
            }
        }
        _ => {
            if config.is_configured() {
                warn!("Auth is configured but no user is signed in, continuing as guest");
            } else {
                info!("Auth is not configured, running in guest mode");
            }

            let guest = GuestIdentityProvider::new(Arc::clone(&local));
            if let Err(e) = guest.enter().await {
                warn!("Failed to record guest mode: {}", e);
            }
            Session::guest(local, guest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use madhumeh_mitra_data::models::DailyLogRecord;
    use madhumeh_mitra_data::repository::InMemoryStorage;

    fn configured(key: &str, user: Option<&str>) -> AuthConfig {
        AuthConfig {
            publishable_key: Some(key.to_string()),
            user_id: user.map(str::to_string),
        }
    }

    #[test]
    fn test_placeholder_key_is_unconfigured() {
        assert!(!AuthConfig::default().is_configured());
        assert!(!configured("  ", None).is_configured());
        assert!(!configured("pk_test_YOUR_KEY_HERE", None).is_configured());
        assert!(configured("pk_live_abc123", None).is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_selects_guest() {
        let local: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let session = select_session(&AuthConfig::default(), Arc::clone(&local)).await;

        assert!(!session.provider.is_authenticated());
        assert_eq!(session.identity(), Identity::Guest);

        let prefs = PreferencesRepository::new(local).load().await.unwrap();
        assert!(prefs.guest_mode);
    }

    #[tokio::test]
    async fn test_configured_selects_user() {
        let local: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let session = select_session(&configured("pk_live_abc123", Some("user_42")), local).await;

        assert!(session.provider.is_authenticated());
        assert_eq!(session.identity(), Identity::User("user_42".to_string()));
    }

    #[tokio::test]
    async fn test_configured_without_user_falls_back_to_guest() {
        let local: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let session = select_session(&configured("pk_live_abc123", None), local).await;
        assert_eq!(session.identity(), Identity::Guest);
    }

    #[tokio::test]
    async fn test_guest_sign_out_clears_flag() {
        let local: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let guest = GuestIdentityProvider::new(Arc::clone(&local));
        guest.enter().await.unwrap();
        guest.sign_out().await.unwrap();

        let prefs = PreferencesRepository::new(local).load().await.unwrap();
        assert!(!prefs.guest_mode);
    }

    #[tokio::test]
    async fn test_authenticated_sign_out_ends_session() {
        let provider = AuthenticatedIdentityProvider::new("user_42");
        provider.sign_out().await.unwrap();
        assert!(!provider.is_authenticated());
        assert_eq!(provider.identity(), Identity::Guest);
    }

    #[tokio::test]
    async fn test_session_sign_out_switches_to_guest_store() {
        let local: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let mut session = select_session(&configured("pk_live_abc123", Some("user_42")), local).await;
        session.sign_out().await.unwrap();

        assert!(!session.provider.is_authenticated());
        assert_eq!(session.identity(), Identity::Guest);

        let log = DailyLogRecord::empty("2024-03-01");
        session.store.put_log(&session.identity(), &log).await.unwrap();
        assert!(session.store.get_log(&session.identity(), &log.date).await.unwrap().is_some());
    }
}
