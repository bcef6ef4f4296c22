//! Crawler-facing documents. Both are rendered once at startup: the registry
//! and site configuration never change while the process runs.

use crate::config::{Config, REDIRECT_PATHS};
use campaigns::CampaignRegistry;
use std::fmt::Write;

const BRIDGE_PRIORITY: &str = "0.9";
const REVIEW_PRIORITY: &str = "1.0";
const STATIC_PRIORITY: &str = "0.3";

pub fn robots_txt(config: &Config) -> String {
    let mut out = String::from("User-agent: *\nAllow: /\n");

    let mut disallowed: Vec<&str> = REDIRECT_PATHS.to_vec();
    for path in &config.robots.disallow {
        if !disallowed.contains(&path.as_str()) {
            disallowed.push(path);
        }
    }
    for path in disallowed {
        let _ = writeln!(out, "Disallow: {path}");
    }

    let _ = writeln!(out, "\nSitemap: {}", absolute(config, "/sitemap.xml"));
    out
}

struct Entry {
    loc: String,
    changefreq: &'static str,
    priority: &'static str,
    alternates: Vec<(String, String)>,
}

/// Lists the bridge and review page of every campaign locale, linked to their
/// translations with hreflang alternates, followed by the configured static
/// pages. Redirect endpoints are never listed.
pub fn sitemap_xml(config: &Config, registry: &CampaignRegistry) -> String {
    let mut entries = Vec::new();

    for campaign in registry.campaigns() {
        let mut bridge_pages = Vec::new();
        let mut review_pages = Vec::new();
        for locale in campaign.locale_codes() {
            let path = format!("/campaigns/{}/{locale}", campaign.name());
            let has_review = campaign
                .resolve_locale_content(locale)
                .is_ok_and(|content| content.review_page.is_some());
            if has_review {
                review_pages.push((locale.to_string(), absolute(config, &format!("{path}/review"))));
            }
            bridge_pages.push((locale.to_string(), absolute(config, &path)));
        }

        for (pages, priority) in [
            (&bridge_pages, BRIDGE_PRIORITY),
            (&review_pages, REVIEW_PRIORITY),
        ] {
            for (_, loc) in pages {
                entries.push(Entry {
                    loc: loc.clone(),
                    changefreq: "monthly",
                    priority,
                    alternates: if pages.len() > 1 { pages.clone() } else { Vec::new() },
                });
            }
        }
    }

    for path in &config.sitemap.static_paths {
        entries.push(Entry {
            loc: absolute(config, path),
            changefreq: "yearly",
            priority: STATIC_PRIORITY,
            alternates: Vec::new(),
        });
    }

    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );
    for entry in entries {
        out.push_str("<url>\n");
        let _ = writeln!(out, "<loc>{}</loc>", escape_xml(&entry.loc));
        for (hreflang, href) in &entry.alternates {
            let _ = writeln!(
                out,
                "<xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>",
                escape_xml(hreflang),
                escape_xml(href)
            );
        }
        let _ = writeln!(out, "<changefreq>{}</changefreq>", entry.changefreq);
        let _ = writeln!(out, "<priority>{}</priority>", entry.priority);
        out.push_str("</url>\n");
    }
    out.push_str("</urlset>\n");
    out
}

fn absolute(config: &Config, path: &str) -> String {
    format!("{}{path}", config.site_url.as_str().trim_end_matches('/'))
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Listener, RobotsConfig, SitemapConfig};
    use campaigns::testutils::{campaign_source, locale_json, registry};
    use url::Url;

    fn config(disallow: &[&str], static_paths: &[&str]) -> Config {
        Config {
            listener: Listener {
                host: "0.0.0.0".into(),
                port: 3000,
            },
            admin_listener: Listener {
                host: "127.0.0.1".into(),
                port: 3001,
            },
            site_url: Url::parse("https://bridge.example/").unwrap(),
            default_campaign: None,
            robots: RobotsConfig {
                disallow: disallow.iter().map(|p| p.to_string()).collect(),
            },
            sitemap: SitemapConfig {
                static_paths: static_paths.iter().map(|p| p.to_string()).collect(),
            },
        }
    }

    #[test]
    fn test_robots_txt() {
        let robots = robots_txt(&config(&["/developers/", "/go"], &[]));
        assert_eq!(
            robots,
            "User-agent: *\n\
             Allow: /\n\
             Disallow: /go\n\
             Disallow: /api/\n\
             Disallow: /developers/\n\
             \n\
             Sitemap: https://bridge.example/sitemap.xml\n"
        );

        // Redirect paths are disallowed even without extra configuration
        let robots = robots_txt(&config(&[], &[]));
        assert!(robots.contains("Disallow: /go\n"));
        assert!(robots.contains("Disallow: /api/\n"));
    }

    #[test]
    fn test_sitemap_lists_locale_pages() {
        let mut source = campaign_source("mitolyn", &["en-US", "pt-BR"]);
        let mut fr = locale_json("fr-CA");
        fr.as_object_mut().unwrap().remove("review_page");
        source.locales.insert("fr-CA".into(), fr);
        let reg = registry(vec![source], &[]);

        let xml = sitemap_xml(&config(&[], &["/termos", "/privacidade"]), &reg);

        for loc in [
            "https://bridge.example/campaigns/mitolyn/en-US",
            "https://bridge.example/campaigns/mitolyn/pt-BR",
            "https://bridge.example/campaigns/mitolyn/fr-CA",
            "https://bridge.example/campaigns/mitolyn/en-US/review",
            "https://bridge.example/campaigns/mitolyn/pt-BR/review",
            "https://bridge.example/termos",
            "https://bridge.example/privacidade",
        ] {
            assert!(xml.contains(&format!("<loc>{loc}</loc>")), "{loc}\n{xml}");
        }
        assert!(!xml.contains("fr-CA/review"), "{xml}");
        assert!(!xml.contains("/go"), "{xml}");
        assert!(!xml.contains("/api/"), "{xml}");

        assert!(xml.contains(
            "<xhtml:link rel=\"alternate\" hreflang=\"fr-CA\" href=\"https://bridge.example/campaigns/mitolyn/fr-CA\"/>"
        ));
        // 3 bridge entries * 3 alternates + 2 review entries * 2 alternates
        assert_eq!(xml.matches("<xhtml:link").count(), 13);
        assert_eq!(xml.matches("<priority>1.0</priority>").count(), 2);
        assert_eq!(xml.matches("<priority>0.3</priority>").count(), 2);
    }

    #[test]
    fn test_sitemap_single_locale_has_no_alternates() {
        let reg = registry(vec![campaign_source("mitolyn", &["en-US"])], &[]);
        let xml = sitemap_xml(&config(&[], &[]), &reg);
        assert!(!xml.contains("<xhtml:link"));
        assert_eq!(xml.matches("<url>").count(), 2);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("/a?b=1&c=<2>"), "/a?b=1&amp;c=&lt;2&gt;");
    }
}
