// ABOUTME: Error types for image extraction and preloading.
// ABOUTME: Provides ImagesError for engine operations and HostError for environment probing.

use std::fmt;
use thiserror::Error;

/// Errors surfaced by the extraction engine and the preloader.
#[derive(Debug, Error)]
pub enum ImagesError {
    /// The configured source is neither a string nor a markup-bearing element.
    #[error("source must be an HTML/CSS string or a valid markup-bearing element")]
    InvalidSource,

    /// Stylesheet scanning was requested without a live document.
    #[error("stylesheets can only be scanned inside a browser-like context")]
    UnsupportedContext,

    /// A stylesheet exists but its rules cannot be read (e.g. cross-origin).
    #[error("stylesheet {href} is not readable: {reason}")]
    StylesheetAccess { href: String, reason: String },

    /// Starting an image load failed before any request was issued.
    #[error("failed to start loading {url}: {reason}")]
    PreloadStart { url: String, reason: String },
}

impl ImagesError {
    /// Creates a StylesheetAccess error for the given sheet.
    pub fn stylesheet_access(href: impl Into<String>, reason: impl fmt::Display) -> Self {
        ImagesError::StylesheetAccess {
            href: href.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a PreloadStart error from the underlying cause.
    pub fn preload_start(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        ImagesError::PreloadStart {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_invalid_source(&self) -> bool {
        matches!(self, ImagesError::InvalidSource)
    }

    pub fn is_unsupported_context(&self) -> bool {
        matches!(self, ImagesError::UnsupportedContext)
    }

    pub fn is_preload_start(&self) -> bool {
        matches!(self, ImagesError::PreloadStart { .. })
    }
}

/// Reasons a host cannot hand out a document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("no document is attached to this host")]
    NoDocument,

    #[error("host environment unavailable: {0}")]
    Unavailable(String),
}
