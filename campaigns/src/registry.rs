//! Immutable campaign registry.
//!
//! The registry is built once at startup from [`CampaignSource`]s and an
//! environment lookup, validated eagerly, and then only read. Request handlers
//! share it through an `Arc`; nothing mutates it afterwards, so lookups need no
//! locking.
//!
//! Campaign identifiers are matched case-insensitively. Identifiers outside
//! `[a-z0-9_-]{1,64}` (after lower-casing) never match anything.

use crate::config::CampaignSource;
use crate::content::{LocaleContent, Theme};
use crate::errors::{ConfigError, ResolveError};
use indexmap::IndexMap;
use url::Url;

const MAX_CAMPAIGN_NAME_LEN: usize = 64;

/// Bound on untrusted request input echoed into errors and logs.
const MAX_LOGGED_INPUT_LEN: usize = 64;

/// Values that mean "no destination yet" rather than a real URL.
const PLACEHOLDER_DESTINATIONS: &[&str] = &["", "/#", "#"];

/// Name of the environment variable holding a campaign's affiliate URL:
/// `mitolyn` -> `MITOLYN_AFFILIATE_URL`, `keto-max` -> `KETO_MAX_AFFILIATE_URL`.
pub fn affiliate_env_var(campaign: &str) -> String {
    let upper: String = campaign
        .chars()
        .map(|c| match c {
            '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    format!("{upper}_AFFILIATE_URL")
}

/// Lower-cases `campaign_id` if it is a valid identifier.
pub fn normalize_campaign_id(campaign_id: &str) -> Option<String> {
    let valid = !campaign_id.is_empty()
        && campaign_id.len() <= MAX_CAMPAIGN_NAME_LEN
        && campaign_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    valid.then(|| campaign_id.to_ascii_lowercase())
}

fn is_valid_locale_code(locale: &str) -> bool {
    !locale.is_empty()
        && locale.len() <= 35
        && !locale.starts_with('-')
        && !locale.ends_with('-')
        && locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Where a configured destination came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DestinationOrigin {
    Static,
    Env(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Configured { url: Url, origin: DestinationOrigin },
    Unset,
}

impl Destination {
    /// Interprets a raw destination value. Placeholders mean unset; anything
    /// else must be an absolute http(s) URL.
    fn parse(raw: &str, origin: DestinationOrigin) -> Result<Self, String> {
        let raw = raw.trim();
        if PLACEHOLDER_DESTINATIONS.contains(&raw) {
            return Ok(Destination::Unset);
        }

        let url = Url::parse(raw).map_err(|e| e.to_string())?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(format!("{raw:?} is not an absolute http(s) URL"));
        }
        Ok(Destination::Configured { url, origin })
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            Destination::Configured { url, .. } => Some(url),
            Destination::Unset => None,
        }
    }
}

#[derive(Debug)]
pub struct Campaign {
    name: String,
    env_var: String,
    destination: Destination,
    default_locale: Option<String>,
    theme: Theme,
    locales: IndexMap<String, LocaleContent>,
}

impl Campaign {
    fn from_source<F>(source: CampaignSource, env: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = normalize_campaign_id(&source.name)
            .ok_or_else(|| ConfigError::InvalidCampaignName(source.name.clone()))?;
        let env_var = affiliate_env_var(&name);

        let static_destination = match source.affiliate_url.as_deref() {
            Some(raw) => Destination::parse(raw, DestinationOrigin::Static).map_err(|reason| {
                ConfigError::InvalidDestination {
                    campaign: name.clone(),
                    origin: "affiliate_url".to_string(),
                    reason,
                }
            })?,
            None => Destination::Unset,
        };

        let destination = match static_destination {
            Destination::Unset => match env(&env_var) {
                Some(raw) => Destination::parse(&raw, DestinationOrigin::Env(env_var.clone()))
                    .map_err(|reason| ConfigError::InvalidDestination {
                        campaign: name.clone(),
                        origin: env_var.clone(),
                        reason,
                    })?,
                None => Destination::Unset,
            },
            configured => configured,
        };

        if let Some((field, value)) = source.theme.colors.invalid_colors().into_iter().next() {
            return Err(ConfigError::InvalidThemeColor {
                campaign: name,
                field,
                value: value.to_string(),
            });
        }

        if source.locales.is_empty() {
            return Err(ConfigError::NoLocales(name));
        }

        let mut locales = IndexMap::with_capacity(source.locales.len());
        for (locale, value) in source.locales {
            if !is_valid_locale_code(&locale) {
                return Err(ConfigError::InvalidLocaleCode {
                    campaign: name,
                    locale,
                });
            }
            let content = LocaleContent::from_value(&locale, value).map_err(|reason| {
                ConfigError::ContentSchemaInvalid {
                    campaign: name.clone(),
                    locale: locale.clone(),
                    reason,
                }
            })?;
            locales.insert(locale, content);
        }

        if let Some(default_locale) = &source.default_locale
            && !locales.contains_key(default_locale)
        {
            return Err(ConfigError::UnknownDefaultLocale {
                campaign: name,
                locale: default_locale.clone(),
            });
        }

        Ok(Campaign {
            name,
            env_var,
            destination,
            default_locale: source.default_locale,
            theme: source.theme,
            locales,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The environment variable consulted for this campaign's destination.
    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Same-origin link pages use for outbound clicks.
    pub fn cloak_path(&self) -> String {
        format!("/api/go/{}", self.name)
    }

    pub fn default_locale(&self) -> Option<&str> {
        self.default_locale.as_deref()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Locale codes in configuration order.
    pub fn locale_codes(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    /// Exact-match lookup of a locale bundle. There is no fallback to another
    /// locale: serving the wrong language is worse than a 404.
    pub fn resolve_locale_content(&self, requested: &str) -> Result<&LocaleContent, ResolveError> {
        self.locales
            .get(requested)
            .ok_or_else(|| ResolveError::LocaleNotFound {
                campaign: self.name.clone(),
                locale: requested.chars().take(MAX_LOGGED_INPUT_LEN).collect(),
            })
    }
}

#[derive(Debug)]
pub struct CampaignRegistry {
    campaigns: IndexMap<String, Campaign>,
}

impl CampaignRegistry {
    /// Builds and validates the registry. `env` is consulted once per campaign
    /// without a static destination.
    pub fn load<F>(sources: Vec<CampaignSource>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut campaigns = IndexMap::with_capacity(sources.len());
        for source in sources {
            let campaign = Campaign::from_source(source, &env)?;
            if campaigns.contains_key(campaign.name()) {
                return Err(ConfigError::DuplicateCampaign(campaign.name));
            }
            // `keto-max` and `keto_max` map to the same variable
            if let Some(other) = campaigns
                .values()
                .find(|other: &&Campaign| other.env_var == campaign.env_var)
            {
                return Err(ConfigError::DuplicateEnvVar {
                    campaign: campaign.name,
                    other: other.name.clone(),
                    env_var: campaign.env_var,
                });
            }
            campaigns.insert(campaign.name.clone(), campaign);
        }

        Ok(CampaignRegistry { campaigns })
    }

    /// Builds the registry against the process environment.
    pub fn from_process_env(sources: Vec<CampaignSource>) -> Result<Self, ConfigError> {
        Self::load(sources, |name| std::env::var(name).ok())
    }

    pub fn get(&self, campaign_id: &str) -> Option<&Campaign> {
        let key = normalize_campaign_id(campaign_id)?;
        self.campaigns.get(&key)
    }

    /// Campaigns in configuration order.
    pub fn campaigns(&self) -> impl Iterator<Item = &Campaign> {
        self.campaigns.values()
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    /// Finds the campaign and bundle for a locale-scoped page.
    pub fn resolve_page(
        &self,
        campaign_id: &str,
        locale: &str,
    ) -> Result<(&Campaign, &LocaleContent), ResolveError> {
        let campaign = self
            .get(campaign_id)
            .ok_or_else(|| not_configured(campaign_id))?;
        let content = campaign.resolve_locale_content(locale)?;
        Ok((campaign, content))
    }
}

/// Builds a `CampaignNotConfigured` for an untrusted id, bounded in length.
pub(crate) fn not_configured(campaign_id: &str) -> ResolveError {
    let shown: String = campaign_id.chars().take(MAX_LOGGED_INPUT_LEN).collect();
    ResolveError::CampaignNotConfigured {
        env_var: affiliate_env_var(&shown),
        campaign_id: shown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{campaign_source, locale_json, no_env, registry};
    use std::ptr;

    #[test]
    fn test_env_var_name() {
        assert_eq!(affiliate_env_var("mitolyn"), "MITOLYN_AFFILIATE_URL");
        assert_eq!(affiliate_env_var("keto-max"), "KETO_MAX_AFFILIATE_URL");
    }

    #[test]
    fn test_normalize_campaign_id() {
        assert_eq!(normalize_campaign_id("Mitolyn").as_deref(), Some("mitolyn"));
        assert_eq!(normalize_campaign_id("keto_max-2").as_deref(), Some("keto_max-2"));
        assert_eq!(normalize_campaign_id(""), None);
        assert_eq!(normalize_campaign_id("mitolyn "), None);
        assert_eq!(normalize_campaign_id("../etc"), None);
        assert_eq!(normalize_campaign_id("mitolyn%20"), None);
        assert_eq!(normalize_campaign_id(&"a".repeat(65)), None);
    }

    #[test]
    fn test_destination_parse() {
        for placeholder in ["", "  ", "/#", "#"] {
            assert_eq!(
                Destination::parse(placeholder, DestinationOrigin::Static),
                Ok(Destination::Unset)
            );
        }

        let destination =
            Destination::parse("https://partner.example/offer", DestinationOrigin::Static).unwrap();
        assert_eq!(
            destination.url().map(Url::as_str),
            Some("https://partner.example/offer")
        );

        assert!(Destination::parse("/offer", DestinationOrigin::Static).is_err());
        assert!(Destination::parse("javascript:alert(1)", DestinationOrigin::Static).is_err());
        assert!(Destination::parse("ftp://partner.example", DestinationOrigin::Static).is_err());
    }

    #[test]
    fn test_destination_sources() {
        // Env var used when no static destination is configured
        let reg = registry(
            vec![campaign_source("mitolyn", &["en-US"])],
            &[("MITOLYN_AFFILIATE_URL", "https://partner.example/offer")],
        );
        let campaign = reg.get("mitolyn").unwrap();
        assert_eq!(
            campaign.destination(),
            &Destination::Configured {
                url: Url::parse("https://partner.example/offer").unwrap(),
                origin: DestinationOrigin::Env("MITOLYN_AFFILIATE_URL".into()),
            }
        );

        // Static destination wins over the env var
        let mut source = campaign_source("mitolyn", &["en-US"]);
        source.affiliate_url = Some("https://static.example/".into());
        let reg = registry(
            vec![source],
            &[("MITOLYN_AFFILIATE_URL", "https://partner.example/offer")],
        );
        assert_eq!(
            reg.get("mitolyn").unwrap().destination().url().map(Url::as_str),
            Some("https://static.example/")
        );

        // Placeholder static value falls through to the env var
        let mut source = campaign_source("mitolyn", &["en-US"]);
        source.affiliate_url = Some("/#".into());
        let reg = registry(vec![source], &[]);
        assert_eq!(reg.get("mitolyn").unwrap().destination(), &Destination::Unset);
    }

    #[test]
    fn test_invalid_destination_is_fatal() {
        let err = CampaignRegistry::load(vec![campaign_source("mitolyn", &["en-US"])], |_| {
            Some("not a url".into())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDestination { ref origin, .. } if origin == "MITOLYN_AFFILIATE_URL"
        ));

        // A bad static value is fatal too and never falls through to the env var
        let mut source = campaign_source("mitolyn", &["en-US"]);
        source.affiliate_url = Some("partner.example/offer".into());
        let err = CampaignRegistry::load(vec![source], |_| {
            Some("https://partner.example/offer".into())
        })
        .unwrap_err();
        match err {
            ConfigError::InvalidDestination {
                campaign, origin, ..
            } => {
                assert_eq!(campaign, "mitolyn");
                assert_eq!(origin, "affiliate_url");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_errors() {
        let err = CampaignRegistry::load(vec![campaign_source("bad name", &["en-US"])], no_env)
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidCampaignName("bad name".into()));

        let err = CampaignRegistry::load(
            vec![
                campaign_source("mitolyn", &["en-US"]),
                campaign_source("MITOLYN", &["pt-BR"]),
            ],
            no_env,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateCampaign("mitolyn".into()));

        let err = CampaignRegistry::load(
            vec![
                campaign_source("keto-max", &["en-US"]),
                campaign_source("keto_max", &["en-US"]),
            ],
            |name| (name == "KETO_MAX_AFFILIATE_URL").then(|| "https://partner.example/a".into()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateEnvVar {
                campaign: "keto_max".into(),
                other: "keto-max".into(),
                env_var: "KETO_MAX_AFFILIATE_URL".into(),
            }
        );

        let err = CampaignRegistry::load(vec![campaign_source("mitolyn", &[])], no_env).unwrap_err();
        assert_eq!(err, ConfigError::NoLocales("mitolyn".into()));

        let mut source = campaign_source("mitolyn", &["en-US"]);
        source.default_locale = Some("pt-BR".into());
        let err = CampaignRegistry::load(vec![source], no_env).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDefaultLocale { .. }));

        let mut source = campaign_source("mitolyn", &["en-US"]);
        source.locales.insert("en US".into(), locale_json("en US"));
        let err = CampaignRegistry::load(vec![source], no_env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLocaleCode { .. }));

        let mut source = campaign_source("mitolyn", &["en-US"]);
        source.theme.colors.footer_bg = "grey".into();
        let err = CampaignRegistry::load(vec![source], no_env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidThemeColor { field: "footer_bg", .. }
        ));
    }

    #[test]
    fn test_content_schema_invalid_names_campaign_and_locale() {
        let mut source = campaign_source("mitolyn", &["en-US", "pt-BR"]);
        source.locales["pt-BR"]["bridge_page"]
            .as_object_mut()
            .unwrap()
            .remove("hero");

        let err = CampaignRegistry::load(vec![source], no_env).unwrap_err();
        match err {
            ConfigError::ContentSchemaInvalid {
                campaign,
                locale,
                reason,
            } => {
                assert_eq!(campaign, "mitolyn");
                assert_eq!(locale, "pt-BR");
                assert!(reason.contains("hero"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_untrusted_locale_is_bounded() {
        let reg = registry(vec![campaign_source("mitolyn", &["en-US"])], &[]);
        let err = reg
            .get("mitolyn")
            .unwrap()
            .resolve_locale_content(&"x".repeat(10_000))
            .unwrap_err();
        match err {
            ResolveError::LocaleNotFound { locale, .. } => {
                assert_eq!(locale.len(), MAX_LOGGED_INPUT_LEN)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let reg = registry(vec![campaign_source("mitolyn", &["en-US"])], &[]);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("MITOLYN").unwrap().name(), "mitolyn");
        assert!(reg.get("mitolyn/").is_none());
        assert!(reg.get("unknown").is_none());
    }

    #[test]
    fn test_resolve_locale_content() {
        let reg = registry(vec![campaign_source("mitolyn", &["pt-BR", "en-US"])], &[]);
        let campaign = reg.get("mitolyn").unwrap();

        let content = campaign.resolve_locale_content("en-US").unwrap();
        assert_eq!(content.layout.lang, "en-US");
        assert_eq!(
            campaign.locale_codes().collect::<Vec<_>>(),
            vec!["pt-BR", "en-US"]
        );

        // Same reference on every call
        let again = campaign.resolve_locale_content("en-US").unwrap();
        assert!(ptr::eq(content, again));

        // No fallback to another locale, not even a close one
        for requested in ["fr-FR", "en-us", "en", ""] {
            assert_eq!(
                campaign.resolve_locale_content(requested).unwrap_err(),
                ResolveError::LocaleNotFound {
                    campaign: "mitolyn".into(),
                    locale: requested.into(),
                }
            );
        }
    }

    #[test]
    fn test_resolve_page() {
        let reg = registry(vec![campaign_source("mitolyn", &["pt-BR", "en-US"])], &[]);

        let (campaign, content) = reg.resolve_page("mitolyn", "pt-BR").unwrap();
        assert_eq!(campaign.name(), "mitolyn");
        assert_eq!(campaign.cloak_path(), "/api/go/mitolyn");
        assert_eq!(content.layout.lang, "pt-BR");

        assert_eq!(
            reg.resolve_page("unknown", "pt-BR").unwrap_err().kind(),
            "CampaignNotConfigured"
        );
        assert_eq!(
            reg.resolve_page("mitolyn", "fr-FR").unwrap_err().kind(),
            "LocaleNotFound"
        );
    }
}
