//! Affiliate link cloaking.
//!
//! A cloak request names a campaign; the outcome is always a 307 redirect,
//! either to the campaign's configured destination or to the site root. The
//! destination is never taken from the request itself.

use crate::errors::ResolveError;
use crate::registry::{CampaignRegistry, Destination, not_configured};
use http::StatusCode;

/// Where failed resolutions send the visitor.
pub const FALLBACK_LOCATION: &str = "/";

/// Temporary: the destination may rotate, and the method is preserved.
pub const REDIRECT_STATUS: StatusCode = StatusCode::TEMPORARY_REDIRECT;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectOutcome {
    location: String,
    campaign: Option<String>,
    failure: Option<ResolveError>,
}

impl RedirectOutcome {
    pub fn status(&self) -> StatusCode {
        REDIRECT_STATUS
    }

    /// Either a configured destination or [`FALLBACK_LOCATION`]; never empty.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Registered name of the campaign whose destination was used.
    pub fn campaign(&self) -> Option<&str> {
        self.campaign.as_deref()
    }

    /// Why the fallback was used, if it was.
    pub fn failure(&self) -> Option<&ResolveError> {
        self.failure.as_ref()
    }

    pub fn is_fallback(&self) -> bool {
        self.failure.is_some()
    }

    fn fallback(failure: ResolveError) -> Self {
        tracing::error!(
            kind = failure.kind(),
            error = %failure,
            "affiliate redirect not configured, sending visitor to the site root"
        );
        Self {
            location: FALLBACK_LOCATION.to_string(),
            campaign: None,
            failure: Some(failure),
        }
    }
}

impl CampaignRegistry {
    /// Resolves the outbound destination for `campaign_id`.
    ///
    /// Unknown campaigns and campaigns without a destination fall back to
    /// [`FALLBACK_LOCATION`] and emit one error record naming the campaign and
    /// the environment variable to set.
    pub fn resolve_redirect(&self, campaign_id: &str) -> RedirectOutcome {
        let Some(campaign) = self.get(campaign_id) else {
            return RedirectOutcome::fallback(not_configured(campaign_id));
        };

        match campaign.destination() {
            Destination::Configured { url, .. } => RedirectOutcome {
                location: url.as_str().to_string(),
                campaign: Some(campaign.name().to_string()),
                failure: None,
            },
            Destination::Unset => RedirectOutcome::fallback(ResolveError::DestinationNotConfigured {
                campaign: campaign.name().to_string(),
                env_var: campaign.env_var().to_string(),
            }),
        }
    }
}
