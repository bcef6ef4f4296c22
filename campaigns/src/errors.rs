use thiserror::Error;

/// Request-time lookup failures. Each one has a safe fallback at the HTTP layer
/// (redirect to the site root, or a 404) and never escapes as a server error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no campaign registered under {campaign_id:?} (would read {env_var})")]
    CampaignNotConfigured { campaign_id: String, env_var: String },

    #[error("campaign {campaign} has no affiliate destination, set {env_var}")]
    DestinationNotConfigured { campaign: String, env_var: String },

    #[error("campaign {campaign} has no content for locale {locale:?}")]
    LocaleNotFound { campaign: String, locale: String },
}

impl ResolveError {
    /// Stable name used in log records and metric tags.
    pub const fn kind(&self) -> &'static str {
        match self {
            ResolveError::CampaignNotConfigured { .. } => "CampaignNotConfigured",
            ResolveError::DestinationNotConfigured { .. } => "DestinationNotConfigured",
            ResolveError::LocaleNotFound { .. } => "LocaleNotFound",
        }
    }
}

/// Load-time configuration errors. Any of these aborts startup.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid campaign name {0:?}: expected 1-64 characters of [a-z0-9_-]")]
    InvalidCampaignName(String),

    #[error("duplicate campaign name: {0}")]
    DuplicateCampaign(String),

    #[error("campaigns {campaign} and {other} both read their destination from {env_var}")]
    DuplicateEnvVar {
        campaign: String,
        other: String,
        env_var: String,
    },

    #[error("campaign {0} has no locales")]
    NoLocales(String),

    #[error("campaign {campaign} has an invalid locale code {locale:?}")]
    InvalidLocaleCode { campaign: String, locale: String },

    #[error("campaign {campaign} default locale {locale:?} is not one of its locales")]
    UnknownDefaultLocale { campaign: String, locale: String },

    #[error("campaign {campaign} has an invalid affiliate destination in {origin}: {reason}")]
    InvalidDestination {
        campaign: String,
        origin: String,
        reason: String,
    },

    #[error("campaign {campaign} theme color {field} is not a hex color: {value:?}")]
    InvalidThemeColor {
        campaign: String,
        field: &'static str,
        value: String,
    },

    #[error("ContentSchemaInvalid: campaign {campaign} locale {locale}: {reason}")]
    ContentSchemaInvalid {
        campaign: String,
        locale: String,
        reason: String,
    },
}
