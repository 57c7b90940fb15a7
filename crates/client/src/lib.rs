//! Tiffin client - typed access to the restaurant discovery backend.
//!
//! All business logic (search ranking, geospatial distance, persistence,
//! authentication) lives in the backend HTTP API. This crate is the typed
//! client on top of it:
//!
//! - [`config`] - environment-driven configuration
//! - [`credentials`] - persisted access/refresh token storage
//! - [`api`] - one operation per backend endpoint, with the
//!   `{success, data}` envelope handled centrally
//! - [`session`] - the observable login/restore/logout state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tiffin_client::{ApiClient, Config, FileCredentialStore, Session};
//!
//! let config = Config::from_env()?;
//! let store = Arc::new(FileCredentialStore::new()?);
//! let api = ApiClient::new(&config, store);
//! let session = Session::new(api.clone());
//!
//! // Attempt a silent restore from the persisted token
//! session.restore().await;
//!
//! let restaurants = api.get_restaurants(&Default::default()).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod session;

pub use api::ApiClient;
pub use api::types::*;
pub use config::{Config, ConfigError};
pub use credentials::{CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore, TokenPair};
pub use error::ApiError;
pub use session::{Session, SessionError, SessionState};
