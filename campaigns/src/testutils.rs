use crate::config::CampaignSource;
use crate::content::Theme;
use crate::registry::CampaignRegistry;
use indexmap::IndexMap;
use serde_json::{Value, json};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A complete bundle (bridge and review page) for `lang`.
pub fn locale_json(lang: &str) -> Value {
    json!({
        "metadata": {
            "title": format!("Mitolyn ({lang}) - A Simple Solution for Real Results"),
            "description": "Discover a science-backed way to kickstart your metabolism."
        },
        "assets": {
            "author_photo": "/campaigns/mitolyn/brand/author-photo.jpg",
            "carousel_thumbnails": [
                {"src": "/campaigns/mitolyn/thumbnails/thumb-1.png", "alt": "Sunrise on a beach"}
            ],
            "testimonial_photos": ["/images/testimonials/person-2.jpeg"],
            "guarantee_seal": "/images/seals/sello-2_png.png",
            "quality_seals": [
                {"src": "/images/seals/sello-1_png.png", "alt": "Harvard Research"}
            ],
            "university_logos": [
                {"src": "/images/logos/harvard.png", "alt": "Harvard", "width": 120, "height": 40}
            ]
        },
        "layout": {
            "lang": lang,
            "scrolling_banner_text": "LIMITED TIME OFFER: 75% OFF TODAY ONLY!",
            "header": {
                "logo_url": "/campaigns/mitolyn/brand/logo.png",
                "cta_text": "Start Now"
            },
            "footer": {
                "copyright": "© Mitolyn. All rights reserved.",
                "links": [{"label": "Terms of Use", "href": "/termos"}],
                "disclaimer": "Statements on this website have not been evaluated by the FDA."
            }
        },
        "bridge_page": {
            "hero": {
                "title": "Feeling Totally Frustrated Trying to Lose Weight?",
                "subtitle": "Complicated diets and brutal workouts just not cutting it?"
            },
            "thumb_section": {
                "alt_text": "A simple solution for real results",
                "cta_button_text": "Start Now!"
            },
            "science_section": {
                "intro": "What if there was a natural way to kickstart your metabolism?",
                "body": "Researchers found the secret might be optimizing your mitochondria."
            },
            "social_proof_section": {
                "title": "Thousands of folks have already used our approach.",
                "subtitle": "Here's what you can expect:",
                "benefits": ["Fire up your metabolism naturally"]
            },
            "empathy_section": {
                "text": "The weight loss industry makes this harder than it needs to be.",
                "final_question": "Curious how it works?"
            },
            "final_cta": {"button_text": "Find out how to kickstart your change!"},
            "university_logos_section": {"title": "AS MENTIONED IN RESEARCH FROM"}
        },
        "review_page": {
            "intro": {
                "opening_question": "Does Mitolyn Work? My Honest Review",
                "paragraphs": ["If you got here, you are probably tired of empty promises."],
                "benefits": ["Faster metabolism"],
                "cta": {"button_text": "SEE THE DISCOUNTED OFFER"}
            },
            "author": {"name": "Dr. Ana Silva", "credentials": "Nutritionist"},
            "problem_section": {
                "title": "The struggle with the scale is real",
                "paragraphs": ["Recent science shows the problem may be cellular."]
            },
            "double_scrolling_banner_section": {
                "testimonials": [{"name": "Maria S.", "rating": 5}],
                "logos": [{"image_src": "/images/logos/lab.png", "alt_text": "Lab"}]
            },
            "ingredient_section": {
                "title": "What is inside",
                "ingredients": [{"name": "Maqui Berry", "description": "Rich in antioxidants."}]
            },
            "testimonial_section": {
                "title": "What customers say",
                "testimonials": [
                    {"quote": "I have more energy.", "author": "João P.", "location": "Lisbon"}
                ]
            },
            "guarantee_section": {"title": "180-day guarantee", "text": "Full refund, no questions."},
            "faq_section": {
                "title": "Frequently asked questions",
                "faqs": [{"question": "Is it safe?", "answer": "Consult your physician first."}]
            },
            "final_cta": {"title": "Ready to start?", "button_text": "ORDER NOW"}
        }
    })
}

/// A campaign with a complete bundle for each of `locales`, in order.
pub fn campaign_source(name: &str, locales: &[&str]) -> CampaignSource {
    CampaignSource {
        name: name.to_string(),
        affiliate_url: None,
        default_locale: None,
        theme: Theme::default(),
        locales: locales
            .iter()
            .map(|locale| (locale.to_string(), locale_json(locale)))
            .collect::<IndexMap<_, _>>(),
    }
}

pub fn no_env(_name: &str) -> Option<String> {
    None
}

/// Builds a registry against a fixed environment instead of the process one.
pub fn registry(sources: Vec<CampaignSource>, env: &[(&str, &str)]) -> CampaignRegistry {
    let env: Vec<(String, String)> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    CampaignRegistry::load(sources, move |name| {
        env.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    })
    .expect("valid test registry")
}

/// Collects the formatted output of every log record emitted inside `capture`.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

pub struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter(Arc::clone(&self.0))
    }
}

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    pub fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().expect("lock output").clone();
        String::from_utf8(bytes).expect("utf8 log output")
    }
}
