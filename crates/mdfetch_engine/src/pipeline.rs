use std::sync::Arc;

use mdfetch_logging::{mdfetch_debug, mdfetch_info};

use crate::backend::{Backend, Retriever};
use crate::classify::classify;
use crate::config::EngineConfig;
use crate::convert::{Converter, Html2MdConverter};
use crate::decode::decode_lossy;
use crate::locate::{ExecutableLocator, PathLocator};
use crate::render::render;
use crate::resolve::Resolver;
use crate::sanitize::CleaningOptions;
use crate::{ContentKind, FetchError, FetchTarget, RawContent};

/// Signatures of browser error pages that come back with a zero exit status.
const UNREACHABLE_MARKERS: &[&str] = &[
    "This site can't be reached",
    "This site can\u{2019}t be reached",
    "DNS_PROBE_FINISHED_NXDOMAIN",
];

/// Rendered content for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The target as submitted.
    pub target: String,
    /// The normalized URL that was fetched.
    pub url: String,
    pub kind: ContentKind,
    pub backend: String,
    pub content: String,
}

/// Resolve, fetch, validate, classify and render.
#[derive(Clone)]
pub struct Pipeline {
    resolver: Resolver,
    cleaning: CleaningOptions,
    converter: Arc<dyn Converter>,
}

impl Pipeline {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            cleaning: CleaningOptions::default(),
            converter: Arc::new(Html2MdConverter),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::from_config_with_locator(config, Arc::new(PathLocator))
    }

    pub fn from_config_with_locator(
        config: &EngineConfig,
        locator: Arc<dyn ExecutableLocator>,
    ) -> Self {
        let resolver = Resolver::new(locator, config.priority.clone())
            .with_command_settings(config.command.clone())
            .with_fetch_settings(config.http.clone());
        Self::new(resolver).with_cleaning(config.cleaning)
    }

    pub fn with_cleaning(mut self, cleaning: CleaningOptions) -> Self {
        self.cleaning = cleaning;
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn cleaning(&self) -> &CleaningOptions {
        &self.cleaning
    }

    pub fn resolve(&self, preference: Option<&str>) -> Result<Backend, FetchError> {
        self.resolver.resolve(preference)
    }

    /// Full single-target path. The URL is checked before any backend is
    /// resolved, so a malformed target never probes the search path.
    pub async fn fetch_content(
        &self,
        raw_url: &str,
        preference: Option<&str>,
    ) -> Result<Rendered, FetchError> {
        let target = FetchTarget::parse(raw_url)?;
        let backend = self.resolve(preference)?;
        self.fetch_with(&backend, &target).await
    }

    pub async fn fetch_with(
        &self,
        retriever: &dyn Retriever,
        target: &FetchTarget,
    ) -> Result<Rendered, FetchError> {
        let raw = retriever.retrieve(target).await?;
        validate(&raw)?;
        let (kind, content) = self.render_raw(&raw)?;
        mdfetch_info!(
            "rendered {} as {} ({} bytes in, {} bytes out)",
            target.as_str(),
            kind,
            raw.bytes.len(),
            content.len()
        );
        Ok(Rendered {
            target: target.raw().to_string(),
            url: target.as_str().to_string(),
            kind,
            backend: retriever.name().to_string(),
            content,
        })
    }

    /// Classifies and renders already-fetched content.
    pub fn render_raw(&self, raw: &RawContent) -> Result<(ContentKind, String), FetchError> {
        let kind = classify(&raw.bytes);
        let decoded = decode_lossy(&raw.bytes, raw.content_type.as_deref());
        mdfetch_debug!(
            "classified {} as {} (encoding {})",
            raw.target,
            kind,
            decoded.encoding_label
        );
        let content = render(&decoded.text, kind, &self.cleaning, self.converter.as_ref())?;
        Ok((kind, content))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("resolver", &self.resolver)
            .field("cleaning", &self.cleaning)
            .finish_non_exhaustive()
    }
}

/// Rejects content that is a browser's own error page.
pub fn validate(raw: &RawContent) -> Result<(), FetchError> {
    let body = String::from_utf8_lossy(&raw.bytes);
    if UNREACHABLE_MARKERS.iter().any(|marker| body.contains(marker)) {
        return Err(FetchError::fetch_failed("site cannot be reached"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_dns_error_page_is_rejected() {
        let raw = RawContent::new(
            "https://nowhere.invalid/",
            "<html><body><span>This site can\u{2019}t be reached</span></body></html>",
        );
        assert_eq!(
            validate(&raw),
            Err(FetchError::FetchFailed("site cannot be reached".into()))
        );

        let raw = RawContent::new("https://nowhere.invalid/", "DNS_PROBE_FINISHED_NXDOMAIN");
        assert!(validate(&raw).is_err());
    }

    #[test]
    fn ordinary_page_passes_validation() {
        let raw = RawContent::new("https://example.com/", "<html><body>fine</body></html>");
        assert_eq!(validate(&raw), Ok(()));
    }
}
