//! `window.localStorage` token persistence.

use graphura_auth::AuthToken;
use graphura_client::{AUTH_TOKEN_KEY, StoreError, TokenStore};

/// Token kept under `localStorage["authToken"]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageTokenStore;

fn storage() -> Result<web_sys::Storage, StoreError> {
    web_sys::window()
        .ok_or_else(|| StoreError::Unavailable("no window object".into()))?
        .local_storage()
        .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
        .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".into()))
}

impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, StoreError> {
        let raw = storage()?
            .get_item(AUTH_TOKEN_KEY)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?;
        match raw {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(AuthToken::new(raw)?)),
            _ => Ok(None),
        }
    }

    fn save(&self, token: &AuthToken) -> Result<(), StoreError> {
        storage()?
            .set_item(AUTH_TOKEN_KEY, token.expose())
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn clear(&self) -> Result<(), StoreError> {
        storage()?
            .remove_item(AUTH_TOKEN_KEY)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}
