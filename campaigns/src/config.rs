use crate::content::Theme;
use indexmap::IndexMap;
use serde::Deserialize;

/// One campaign as written in configuration, before validation.
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CampaignSource {
    pub name: String,
    /// Static destination. When absent, empty or a placeholder such as "/#",
    /// the destination is read from `<NAME>_AFFILIATE_URL` at startup.
    #[serde(default)]
    pub affiliate_url: Option<String>,
    /// Locale that `/campaigns/{name}` redirects to. Without it that path is a 404.
    #[serde(default)]
    pub default_locale: Option<String>,
    #[serde(default)]
    pub theme: Theme,
    /// Locale bundles, validated into `LocaleContent` when the registry is built.
    /// Kept untyped here so that a bad bundle is reported with its campaign and locale.
    pub locales: IndexMap<String, serde_json::Value>,
}
