use campaigns::CampaignRegistry;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Paths that must never be crawled: following a cloak link could get the
/// destination flagged.
pub const REDIRECT_PATHS: &[&str] = &["/go", "/api/"];

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("site_url must be an absolute http(s) URL: {0}")]
    InvalidSiteUrl(String),

    #[error("default_campaign {0:?} is not a configured campaign")]
    UnknownDefaultCampaign(String),

    #[error("path {0:?} must start with '/'")]
    RelativePath(String),

    #[error("sitemap path {0:?} points at a redirect endpoint")]
    RedirectPathInSitemap(String),
}

/// Public site configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Main listener for visitor traffic
    #[serde(default = "Listener::default_public")]
    pub listener: Listener,
    /// Admin listener for health and readiness probes
    #[serde(default = "Listener::default_admin")]
    pub admin_listener: Listener,
    /// Absolute base URL used in the sitemap and robots.txt
    pub site_url: Url,
    /// Campaign served by the bare `/go` cloak link
    #[serde(default)]
    pub default_campaign: Option<String>,
    #[serde(default)]
    pub robots: RobotsConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
}

impl Config {
    /// Validates the site configuration against the loaded campaigns
    pub fn validate(&self, registry: &CampaignRegistry) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if !matches!(self.site_url.scheme(), "http" | "https") || self.site_url.host_str().is_none()
        {
            return Err(ValidationError::InvalidSiteUrl(self.site_url.to_string()));
        }

        if let Some(campaign) = &self.default_campaign
            && registry.get(campaign).is_none()
        {
            return Err(ValidationError::UnknownDefaultCampaign(campaign.clone()));
        }

        for path in &self.robots.disallow {
            if !path.starts_with('/') {
                return Err(ValidationError::RelativePath(path.clone()));
            }
        }

        for path in &self.sitemap.static_paths {
            if !path.starts_with('/') {
                return Err(ValidationError::RelativePath(path.clone()));
            }
            if is_redirect_path(path) {
                return Err(ValidationError::RedirectPathInSitemap(path.clone()));
            }
        }

        Ok(())
    }
}

/// True for `/go`, `/go/...` and anything under `/api/`.
pub fn is_redirect_path(path: &str) -> bool {
    path == "/go" || path.starts_with("/go/") || path == "/api" || path.starts_with("/api/")
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    fn default_public() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }

    fn default_admin() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3001,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RobotsConfig {
    /// Disallowed in addition to the redirect paths, e.g. "/developers/"
    #[serde(default)]
    pub disallow: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SitemapConfig {
    /// Non-campaign pages to list, e.g. legal pages
    #[serde(default)]
    pub static_paths: Vec<String>,
}
