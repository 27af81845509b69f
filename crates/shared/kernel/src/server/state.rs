use crate::security::admin::{SharedAdminCheck, TokenAdminCheck};
use axum::extract::FromRef;
use depot_domain::config::ApiConfig;
use depot_storage::Storage;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[depot_derive::depot_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub storage: Storage,
    pub admin: SharedAdminCheck,
}

/// Shared application state handed to every handler.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for Storage {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.storage.clone()
    }
}

impl FromRef<ApiState> for SharedAdminCheck {
    fn from_ref(state: &ApiState) -> Self {
        Arc::clone(&state.inner.admin)
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    storage: Option<Storage>,
    admin: Option<SharedAdminCheck>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Overrides the admin check. Defaults to [`TokenAdminCheck`] over `security.admin_token`.
    #[must_use]
    pub fn admin(mut self, admin: SharedAdminCheck) -> Self {
        self.admin = Some(admin);
        self
    }

    /// # Errors
    /// Returns [`ApiStateError::Validation`] when the config or the storage is missing.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let storage = self.storage.ok_or_else(|| ApiStateError::Validation {
            message: "Storage not provided".into(),
            context: None,
        })?;
        let admin = self.admin.unwrap_or_else(|| {
            Arc::new(TokenAdminCheck::new(config.security.admin_token.clone()))
        });

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, storage, admin }) })
    }
}
