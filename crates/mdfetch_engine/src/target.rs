use url::Url;

use crate::FetchError;

const DEFAULT_SCHEME: &str = "https";

/// One URL to retrieve: the string as submitted plus its normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    raw: String,
    url: Url,
}

impl FetchTarget {
    /// Normalizes `raw`: input without a `scheme://` token gets `https://`
    /// prepended, explicit schemes must be `http` or `https`.
    pub fn parse(raw: &str) -> Result<Self, FetchError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FetchError::invalid_url(raw, "empty URL"));
        }

        let url = if trimmed.contains("://") {
            let url = Url::parse(trimmed).map_err(|err| FetchError::invalid_url(raw, err.to_string()))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(FetchError::invalid_url(raw, "must use http or https scheme"));
            }
            url
        } else {
            Url::parse(&format!("{DEFAULT_SCHEME}://{trimmed}"))
                .map_err(|err| FetchError::invalid_url(raw, err.to_string()))?
        };

        if url.host_str().map_or(true, str::is_empty) {
            return Err(FetchError::invalid_url(raw, "missing host"));
        }

        Ok(Self {
            raw: raw.to_string(),
            url,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}
