//! JSON payloads handed to the presentation layer.

use campaigns::content::{
    BridgePage, Layout, LocaleContent, LocalizedAssets, Metadata, ReviewPage, Theme,
};
use campaigns::{Campaign, CampaignRegistry};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
pub struct Alternate {
    pub hreflang: String,
    pub href: String,
}

/// Everything needed to render one locale page. `page` is either the bridge
/// page or the review page of the bundle.
#[derive(Debug, Serialize)]
pub struct PagePayload<'a, P: Serialize> {
    pub campaign: &'a str,
    pub locale: &'a str,
    /// Same-origin link every call to action must use.
    pub cloak_path: String,
    pub theme: &'a Theme,
    pub metadata: &'a Metadata,
    pub assets: &'a LocalizedAssets,
    pub layout: &'a Layout,
    pub alternates: Vec<Alternate>,
    pub page: &'a P,
}

pub fn bridge_payload<'a>(
    campaign: &'a Campaign,
    locale: &'a str,
    content: &'a LocaleContent,
) -> PagePayload<'a, BridgePage> {
    build(campaign, locale, content, &content.bridge_page, "")
}

/// `None` when the bundle has no review page.
pub fn review_payload<'a>(
    campaign: &'a Campaign,
    locale: &'a str,
    content: &'a LocaleContent,
) -> Option<PagePayload<'a, ReviewPage>> {
    let review = content.review_page.as_ref()?;
    Some(build(campaign, locale, content, review, "/review"))
}

fn build<'a, P: Serialize>(
    campaign: &'a Campaign,
    locale: &'a str,
    content: &'a LocaleContent,
    page: &'a P,
    suffix: &str,
) -> PagePayload<'a, P> {
    let alternates = campaign
        .locale_codes()
        .filter(|code| *code != locale)
        .filter(|code| {
            // Review alternates only point at locales that have a review page
            suffix.is_empty()
                || campaign
                    .resolve_locale_content(code)
                    .is_ok_and(|other| other.review_page.is_some())
        })
        .map(|code| Alternate {
            hreflang: code.to_string(),
            href: format!("/campaigns/{}/{code}{suffix}", campaign.name()),
        })
        .collect();

    PagePayload {
        campaign: campaign.name(),
        locale,
        cloak_path: campaign.cloak_path(),
        theme: campaign.theme(),
        metadata: &content.metadata,
        assets: &content.assets,
        layout: &content.layout,
        alternates,
        page,
    }
}

#[derive(Debug, Serialize)]
pub struct SiteIndex<'a> {
    pub campaigns: Vec<CampaignSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct CampaignSummary<'a> {
    pub name: &'a str,
    pub cloak_path: String,
    pub default_locale: Option<&'a str>,
    pub pages: Vec<String>,
}

pub fn site_index(registry: &CampaignRegistry) -> SiteIndex<'_> {
    let campaigns = registry
        .campaigns()
        .map(|campaign| CampaignSummary {
            name: campaign.name(),
            cloak_path: campaign.cloak_path(),
            default_locale: campaign.default_locale(),
            pages: campaign
                .locale_codes()
                .map(|code| format!("/campaigns/{}/{code}", campaign.name()))
                .collect(),
        })
        .collect();
    SiteIndex { campaigns }
}
