use crate::error::ErrorCustomizer;
use authkit_apptoken::TokenSettings;
use authkit_core::{Confirmer, ProfileStore, UserStore};
use authkit_hydra::AuthService;
use authkit_oauth2::{CallbackOrchestrator, ProviderRegistry};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Handler settings taken from configuration.
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    /// Name of the cookie that receives the private access token after a callback.
    pub auth_cookie_name: String,
    pub state: TokenSettings,
    /// When the provider list last changed.
    pub mod_time: DateTime<Utc>,
}

/// Shared state of all handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<HandlerSettings>,
    pub providers: ProviderRegistry,
    pub callback: Arc<CallbackOrchestrator>,
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub confirmer: Arc<dyn Confirmer>,
    pub errors: Arc<dyn ErrorCustomizer>,
}
