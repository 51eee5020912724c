//! HTTP client for the Immich REST API.
//!
//! [`ImmichClient`] implements [`almanac_core::repository::AssetRepository`],
//! so it can be handed straight to the collection engine.
//!
//! ```rust,ignore
//! let config = ApiConfig::new("https://photos.example.com", key);
//! let client = ImmichClient::new(config)?;
//! let albums = client.list_albums().await?;
//! ```

pub mod client;
pub mod error;
pub mod url;

pub use client::{ApiConfig, DEFAULT_TIMEOUT, ImmichClient};
pub use error::{Error, Result};
pub use url::normalize_base_url;
