// ABOUTME: Library entry point for domimages-core, the image reference extraction engine.
// ABOUTME: Re-exports the engine, its sources and hosts, scanners, options and the preloader.

//! Finds every image a page, an HTML fragment or a stylesheet refers to.
//!
//! Image tags, inline `style` backgrounds and stylesheet rules are scanned,
//! merged, normalized and deduplicated. The result can then be preloaded
//! through any [`ImageLoader`].
//!
//! # Example
//!
//! ```
//! use domimages_core::DomImages;
//!
//! let html = r#"<img src="/a.png"><div style="background: url('/b.png')"></div>"#;
//! let images = DomImages::new(html).document_images().unwrap();
//! assert_eq!(images, vec!["/a.png", "/b.png"]);
//! ```

pub mod css;
pub mod engine;
pub mod error;
pub mod host;
pub mod options;
pub mod preload;
pub mod scan;
pub mod source;

pub use crate::engine::DomImages;
pub use crate::error::{HostError, ImagesError};
pub use crate::host::{
    style_sheet_refs, DetachedHost, Document, Element, Host, PageHost, SheetRef, StyleSheet,
};
pub use crate::options::{DomImagesBuilder, Options};
pub use crate::preload::{preload, FailedLoad, ImageLoader, LoadFuture, PreloadReport};
pub use crate::scan::{normalize_image_url, unique_images, Scanner};
pub use crate::source::{MarkupElement, Source};
