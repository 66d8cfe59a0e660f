// ABOUTME: Loads a live page: its HTML plus every stylesheet it links, as a Document snapshot.
// ABOUTME: Same-origin sheets are fetched concurrently; cross-origin sheets stay unreadable.

use std::sync::Arc;

use domimages_core::{style_sheet_refs, Document, PageHost, SheetRef, StyleSheet};
use futures::future::join_all;
use url::Url;

use crate::error::FetchError;
use crate::resource::{fetch, FetchOptions};

/// A fetched page ready to be scanned.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects; relative references resolve against it.
    pub url: Url,
    pub document: Arc<Document>,
}

impl Page {
    /// A host exposing this page's document to an engine.
    pub fn host(&self) -> PageHost {
        PageHost::new(Arc::clone(&self.document))
    }
}

/// Fetches `url` and the stylesheets it links.
pub async fn load_page(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<Page, FetchError> {
    let fetched = fetch(client, url, opts).await?;
    let base = Url::parse(&fetched.final_url).map_err(|e| {
        FetchError::invalid_url(url, "LoadPage", Some(anyhow::anyhow!("invalid final URL: {}", e)))
    })?;
    let markup = fetched.text();

    let sheets = style_sheet_refs(&markup)
        .into_iter()
        .map(|sheet| load_style_sheet(client, &base, sheet, opts));
    let style_sheets = join_all(sheets).await;

    tracing::debug!(
        url = %base,
        style_sheets = style_sheets.len(),
        "page loaded"
    );

    Ok(Page {
        url: base,
        document: Arc::new(Document::with_style_sheets(markup, style_sheets)),
    })
}

async fn load_style_sheet(
    client: &reqwest::Client,
    base: &Url,
    sheet: SheetRef,
    opts: &FetchOptions,
) -> StyleSheet {
    let href = match sheet {
        SheetRef::Inline(text) => return StyleSheet::inline(&text),
        SheetRef::Linked(href) => href,
    };

    let resolved = match base.join(&href) {
        Ok(resolved) => resolved,
        Err(err) => {
            tracing::warn!(href = %href, error = %err, "unresolvable stylesheet link");
            return StyleSheet::pending(href);
        }
    };

    if resolved.origin() != base.origin() {
        tracing::debug!(href = %resolved, "cross-origin stylesheet, rules not readable");
        return StyleSheet::restricted(resolved.as_str());
    }

    match fetch(client, resolved.as_str(), opts).await {
        Ok(fetched) => StyleSheet::linked(resolved.as_str(), &fetched.text()),
        Err(err) => {
            tracing::warn!(href = %resolved, error = %err, "stylesheet failed to load");
            StyleSheet::pending(resolved.as_str())
        }
    }
}
