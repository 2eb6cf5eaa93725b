//! Persistence of the authentication token across reloads and processes.

use std::cell::RefCell;
use std::rc::Rc;

use graphura_auth::{AuthToken, TokenError};
use thiserror::Error;

/// Fixed storage key of the persisted token.
pub const AUTH_TOKEN_KEY: &str = "authToken";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage unavailable: {0}")]
    Unavailable(String),

    #[error("stored token is unusable: {0}")]
    Corrupt(#[from] TokenError),
}

/// Where the session token lives between runs.
///
/// Implementations use `&self` with interior mutability: the store is owned
/// by a single-threaded session and shared with nothing else.
pub trait TokenStore {
    fn load(&self) -> Result<Option<AuthToken>, StoreError>;

    fn save(&self, token: &AuthToken) -> Result<(), StoreError>;

    /// Remove the token. Removing an absent token is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Rc<RefCell<Option<AuthToken>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: AuthToken) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(token))),
        }
    }

    pub fn current(&self) -> Option<AuthToken> {
        self.slot.borrow().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, StoreError> {
        Ok(self.current())
    }

    fn save(&self, token: &AuthToken) -> Result<(), StoreError> {
        *self.slot.borrow_mut() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

impl<S: TokenStore + ?Sized> TokenStore for Box<S> {
    fn load(&self) -> Result<Option<AuthToken>, StoreError> {
        (**self).load()
    }

    fn save(&self, token: &AuthToken) -> Result<(), StoreError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs::{File, OpenOptions};
    use std::io::{ErrorKind, Write};
    use std::path::{Path, PathBuf};

    use graphura_auth::AuthToken;

    use super::{AUTH_TOKEN_KEY, StoreError, TokenStore};

    /// Token kept in a single file (one line, no trailing data).
    #[derive(Debug, Clone)]
    pub struct FileTokenStore {
        path: PathBuf,
    }

    impl FileTokenStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// `<data_local_dir>/graphura/authToken`.
        pub fn default_location() -> Result<Self, StoreError> {
            let base = dirs::data_local_dir()
                .ok_or_else(|| StoreError::Unavailable("no local data directory on this platform".into()))?;
            Ok(Self::new(base.join("graphura").join(AUTH_TOKEN_KEY)))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl TokenStore for FileTokenStore {
        fn load(&self) -> Result<Option<AuthToken>, StoreError> {
            match std::fs::read_to_string(&self.path) {
                Ok(raw) if raw.trim().is_empty() => Ok(None),
                Ok(raw) => Ok(Some(AuthToken::new(raw)?)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        }

        fn save(&self, token: &AuthToken) -> Result<(), StoreError> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = open_private(&self.path)?;
            file.write_all(token.expose().as_bytes())?;
            Ok(())
        }

        fn clear(&self) -> Result<(), StoreError> {
            match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        }
    }

    /// Open for writing, readable by the owner only.
    #[cfg(unix)]
    fn open_private(path: &Path) -> std::io::Result<File> {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        // `mode` only applies on creation; tighten a file left by older runs.
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        Ok(file)
    }

    #[cfg(not(unix))]
    fn open_private(path: &Path) -> std::io::Result<File> {
        OpenOptions::new().write(true).create(true).truncate(true).open(path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileTokenStore;
