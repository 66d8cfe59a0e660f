// ABOUTME: Document-backed scanner for browser-like contexts.
// ABOUTME: Reads image tags from the parsed document and background images from its stylesheets.

use std::sync::Arc;

use super::Scanner;
use crate::error::ImagesError;
use crate::host::Document;
use crate::source::Source;

#[derive(Debug, Clone)]
pub struct DomScanner {
    document: Arc<Document>,
}

impl DomScanner {
    pub fn new(document: Arc<Document>) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }
}

impl Scanner for DomScanner {
    /// Images inside an element source; every image in the document otherwise.
    fn scan_tags(&self, source: &Source) -> Result<Vec<String>, ImagesError> {
        match source {
            Source::Element(element) => {
                element.image_sources().ok_or(ImagesError::InvalidSource)
            }
            Source::Text(_) | Source::Unset => Ok(self.document.image_sources()),
        }
    }

    fn scan_stylesheets(&self) -> Result<Vec<String>, ImagesError> {
        let mut images = Vec::new();
        for sheet in self.document.style_sheets() {
            let rules = sheet.rules()?;
            images.extend(rules.iter().filter_map(|rule| rule.background_image()));
        }
        tracing::trace!(
            sheets = self.document.style_sheets().len(),
            images = images.len(),
            "scanned stylesheets"
        );
        Ok(images)
    }
}
