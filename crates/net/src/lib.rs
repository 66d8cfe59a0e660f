// ABOUTME: Networked front end for domimages: page loading, HTTP preloading and logging.
// ABOUTME: Re-exports the public API: load_page, Page, HttpImageLoader, ImageCache, fetch and errors.

//! Loads live pages so their images can be enumerated the way a browser sees
//! them, and preloads image URLs over HTTP into an in-memory cache.
//!
//! # Example
//!
//! ```no_run
//! use domimages_core::{preload, DomImages};
//! use domimages_net::{load_page, FetchOptions, HttpImageLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = reqwest::Client::new();
//!     let page = load_page(&client, "https://example.com/", &FetchOptions::default()).await?;
//!     let engine = DomImages::builder().host(page.host()).build();
//!     let images = engine.document_images()?;
//!
//!     let loader = HttpImageLoader::new(client).base_url(page.url.clone());
//!     let report = preload(&loader, &images, None).await?;
//!     println!("warmed {} of {} images", report.loaded, report.requested);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod logging;
pub mod page;
pub mod resource;

pub use crate::error::{ErrorCode, FetchError};
pub use crate::loader::{HttpImageLoader, ImageCache};
pub use crate::logging::init_logging;
pub use crate::page::{load_page, Page};
pub use crate::resource::{fetch, FetchOptions, FetchResult};
