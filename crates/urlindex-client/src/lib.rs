pub mod auth;
pub mod error;
pub mod google;
pub mod traits;

pub use auth::{AccessToken, ServiceAccountAuth, ServiceAccountKey, SetupStatus, StaticToken};
pub use error::IndexingError;
pub use google::{GoogleIndexingClient, GoogleIndexingClientBuilder, GOOGLE_INDEXING_API_BASE};
pub use traits::{AccessTokenProvider, IndexingClient};

pub use urlindex_types::NotificationType;
