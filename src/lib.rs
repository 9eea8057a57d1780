//! Client-side state core for the school-canteen ordering app.
//!
//! ARCHITECTURE
//! ============
//! Front-ends hold an `Arc<SessionStore>` and an `Arc<FavoritesStore>` and
//! call their operations directly. Both stores mutate in-memory state and the
//! persisted key-value store together, so a restart observes the same state.
//!
//! - `config`: environment-driven client settings.
//! - `storage`: the persisted key-value store (local-storage equivalent).
//! - `net`: wire types, response-envelope handling and the remote API seam.
//! - `state`: the session lifecycle and favorites stores.

pub mod config;
pub mod net;
pub mod state;
pub mod storage;

pub use config::ClientConfig;
pub use net::api::{CanteenApi, HttpApi};
pub use net::types::{ApiError, Product, User};
pub use state::favorites::FavoritesStore;
pub use state::nav::Navigator;
pub use state::session::{Scope, SessionError, SessionPhase, SessionSnapshot, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
