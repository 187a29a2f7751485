mod client;
pub mod types;

pub use client::{GoogleIndexingClient, GoogleIndexingClientBuilder, GOOGLE_INDEXING_API_BASE};
pub use types::{PublishRequest, PublishResponse, UrlNotification, UrlNotificationMetadata};
