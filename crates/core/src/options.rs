// ABOUTME: Configuration for the image extraction engine: Options and DomImagesBuilder.
// ABOUTME: Options deserialize from JSON with defaults; unknown keys are kept but ignored.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::DomImages;
use crate::host::{DetachedHost, Host};
use crate::source::Source;

/// Engine options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Accepted and carried, but no extraction or preload step reads it yet.
    pub skip_dns_name: bool,
    /// Keys this version does not recognise.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            skip_dns_name: true,
            extra: BTreeMap::new(),
        }
    }
}

impl Options {
    /// Merges a JSON object of overrides over the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Builder for constructing DomImages engines.
#[derive(Debug, Clone)]
pub struct DomImagesBuilder {
    source: Source,
    host: Option<Arc<dyn Host>>,
    opts: Options,
}

impl DomImagesBuilder {
    /// Create a builder with no source, a detached host and default options.
    pub fn new() -> Self {
        Self {
            source: Source::Unset,
            host: None,
            opts: Options::default(),
        }
    }

    /// Set the content to scan.
    pub fn source(mut self, source: impl Into<Source>) -> Self {
        self.source = source.into();
        self
    }

    /// Run against the given host environment.
    pub fn host(mut self, host: impl Host + 'static) -> Self {
        self.host = Some(Arc::new(host));
        self
    }

    /// Run against a host shared with other engines.
    pub fn shared_host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    /// Replace all options.
    pub fn options(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    pub fn skip_dns_name(mut self, skip: bool) -> Self {
        self.opts.skip_dns_name = skip;
        self
    }

    /// Build the engine. The scanner variant is picked here, once.
    pub fn build(self) -> DomImages {
        let host = self.host.unwrap_or_else(|| Arc::new(DetachedHost));
        DomImages::assemble(self.source, host, self.opts)
    }
}

impl Default for DomImagesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
