//! Locale content bundles and campaign themes.
//!
//! A [`LocaleContent`] is everything the presentation layer needs to render the
//! bridge page and (optionally) the review page of one campaign in one
//! language. Bundles arrive as loosely typed values from configuration and are
//! checked by [`LocaleContent::from_value`] before they can enter a registry:
//!
//! 1. every string anywhere in the bundle must be non-blank,
//! 2. the value must deserialize into the schema below (no missing or unknown
//!    fields),
//! 3. a few semantic checks must hold (`layout.lang` matches the locale key,
//!    ratings are 1..=5, asset paths are absolute).
//!
//! Empty lists are allowed; a missing review page is expressed by omitting
//! `review_page` entirely, never with placeholder strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LocaleContent {
    pub metadata: Metadata,
    pub assets: LocalizedAssets,
    pub layout: Layout,
    pub bridge_page: BridgePage,
    #[serde(default)]
    pub review_page: Option<ReviewPage>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SizedImage {
    pub src: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

/// Paths are absolute from the site's public root, or full http(s) URLs.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LocalizedAssets {
    pub author_photo: String,
    pub carousel_thumbnails: Vec<Image>,
    pub testimonial_photos: Vec<String>,
    pub guarantee_seal: String,
    pub quality_seals: Vec<Image>,
    pub university_logos: Vec<SizedImage>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    pub lang: String,
    pub scrolling_banner_text: String,
    pub header: Header,
    pub footer: Footer,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Header {
    pub logo_url: String,
    pub cta_text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Footer {
    pub copyright: String,
    pub links: Vec<NavLink>,
    pub disclaimer: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BridgePage {
    pub hero: Hero,
    pub thumb_section: ThumbSection,
    pub science_section: ScienceSection,
    pub social_proof_section: SocialProofSection,
    pub empathy_section: EmpathySection,
    pub final_cta: ButtonCta,
    pub university_logos_section: TitleOnly,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Hero {
    pub title: String,
    pub subtitle: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThumbSection {
    pub alt_text: String,
    pub cta_button_text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScienceSection {
    pub intro: String,
    pub body: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SocialProofSection {
    pub title: String,
    pub subtitle: String,
    pub benefits: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EmpathySection {
    pub text: String,
    pub final_question: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ButtonCta {
    pub button_text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TitleOnly {
    pub title: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReviewPage {
    pub intro: ReviewIntro,
    pub author: Author,
    pub problem_section: ParagraphSection,
    pub double_scrolling_banner_section: DoubleScrollingBannerSection,
    pub ingredient_section: IngredientSection,
    pub testimonial_section: TestimonialSection,
    pub guarantee_section: GuaranteeSection,
    pub faq_section: FaqSection,
    pub final_cta: TitledCta,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReviewIntro {
    pub opening_question: String,
    pub paragraphs: Vec<String>,
    pub benefits: Vec<String>,
    pub cta: ButtonCta,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Author {
    pub name: String,
    pub credentials: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParagraphSection {
    pub title: String,
    pub paragraphs: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DoubleScrollingBannerSection {
    pub testimonials: Vec<RatedTestimonial>,
    pub logos: Vec<BannerLogo>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RatedTestimonial {
    pub name: String,
    pub rating: u8,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BannerLogo {
    pub image_src: String,
    pub alt_text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IngredientSection {
    pub title: String,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Ingredient {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TestimonialSection {
    pub title: String,
    pub testimonials: Vec<Testimonial>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    pub location: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GuaranteeSection {
    pub title: String,
    pub text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FaqSection {
    pub title: String,
    pub faqs: Vec<Faq>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TitledCta {
    pub title: String,
    pub button_text: String,
}

impl LocaleContent {
    /// Builds a bundle for `locale` from an untyped configuration value.
    /// On failure, returns a human readable reason naming the offending fields.
    pub fn from_value(locale: &str, value: Value) -> Result<Self, String> {
        let mut problems = Vec::new();
        collect_blank_strings(&value, "", &mut problems);
        if !problems.is_empty() {
            return Err(format!("blank required fields: {}", problems.join(", ")));
        }

        let content: LocaleContent = serde_json::from_value(value).map_err(|e| e.to_string())?;
        content.check(locale)?;
        Ok(content)
    }

    fn check(&self, locale: &str) -> Result<(), String> {
        let mut problems = Vec::new();

        if self.layout.lang != locale {
            problems.push(format!(
                "layout.lang is {:?} but the bundle is registered as {locale:?}",
                self.layout.lang
            ));
        }

        let assets = &self.assets;
        let mut paths: Vec<(&str, &str)> = vec![
            ("assets.author_photo", assets.author_photo.as_str()),
            ("assets.guarantee_seal", assets.guarantee_seal.as_str()),
            ("layout.header.logo_url", self.layout.header.logo_url.as_str()),
        ];
        paths.extend(
            assets
                .carousel_thumbnails
                .iter()
                .chain(&assets.quality_seals)
                .map(|image| ("assets image", image.src.as_str())),
        );
        paths.extend(
            assets
                .testimonial_photos
                .iter()
                .map(|src| ("assets.testimonial_photos", src.as_str())),
        );
        paths.extend(
            assets
                .university_logos
                .iter()
                .map(|logo| ("assets.university_logos", logo.src.as_str())),
        );
        for (field, path) in paths {
            if !is_asset_path(path) {
                problems.push(format!("{field} {path:?} is not an absolute path or URL"));
            }
        }

        for logo in &assets.university_logos {
            if logo.width == 0 || logo.height == 0 {
                problems.push(format!("university logo {:?} has a zero dimension", logo.src));
            }
        }

        if let Some(review) = &self.review_page {
            for testimonial in &review.double_scrolling_banner_section.testimonials {
                if !(1..=5).contains(&testimonial.rating) {
                    problems.push(format!(
                        "rating for {:?} must be between 1 and 5, got {}",
                        testimonial.name, testimonial.rating
                    ));
                }
            }
        }

        match problems.is_empty() {
            true => Ok(()),
            false => Err(problems.join("; ")),
        }
    }
}

fn is_asset_path(path: &str) -> bool {
    path.starts_with('/') || path.starts_with("https://") || path.starts_with("http://")
}

fn collect_blank_strings(value: &Value, path: &str, problems: &mut Vec<String>) {
    match value {
        Value::String(s) if s.trim().is_empty() => problems.push(display_path(path)),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_blank_strings(item, &format!("{path}[{i}]"), problems);
            }
        }
        Value::Object(fields) => {
            for (key, field) in fields {
                let child = match path.is_empty() {
                    true => key.clone(),
                    false => format!("{path}.{key}"),
                };
                collect_blank_strings(field, &child, problems);
            }
        }
        _ => {}
    }
}

fn display_path(path: &str) -> String {
    match path.is_empty() {
        true => "<root>".to_string(),
        false => path.to_string(),
    }
}

/// Visual settings passed through to the presentation layer untouched.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Theme {
    #[serde(default)]
    pub colors: ThemeColors,
    #[serde(default)]
    pub typography: Typography,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThemeColors {
    pub header_bg: String,
    pub footer_bg: String,
    pub scrolling_banner_bg: String,
    pub button_action_bg: String,
    pub button_action_text: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            header_bg: "#0d40b8".into(),
            footer_bg: "#1F2937".into(),
            scrolling_banner_bg: "#FF4500".into(),
            button_action_bg: "#1e3a8a".into(),
            button_action_text: "#FFFFFF".into(),
        }
    }
}

impl ThemeColors {
    /// Returns (field, value) for every color that is not `#rgb` or `#rrggbb`.
    pub fn invalid_colors(&self) -> Vec<(&'static str, &str)> {
        [
            ("header_bg", &self.header_bg),
            ("footer_bg", &self.footer_bg),
            ("scrolling_banner_bg", &self.scrolling_banner_bg),
            ("button_action_bg", &self.button_action_bg),
            ("button_action_text", &self.button_action_text),
        ]
        .into_iter()
        .filter(|(_, value)| !is_hex_color(value))
        .map(|(field, value)| (field, value.as_str()))
        .collect()
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Typography {
    #[serde(default)]
    pub font_size: Option<u16>,
}
