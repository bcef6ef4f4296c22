use crate::config::Config;
use crate::metrics_defs::{
    PAGE_NOT_FOUND, PAGE_SERVED, REDIRECT_FALLBACK, REDIRECT_RESOLVED, REQUEST_DURATION,
};
use crate::pages::{bridge_payload, review_payload, site_index};
use crate::seo::{robots_txt, sitemap_xml};
use campaigns::redirect::FALLBACK_LOCATION;
use campaigns::{CampaignRegistry, RedirectOutcome};
use http::header::{ALLOW, CACHE_CONTROL, CONTENT_TYPE, HeaderName, LOCATION};
use http::{HeaderValue, Method};
use hyper::body::Bytes;
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use routing::{Params, Route, RouteTable};
use serde::Serialize;
use shared::http::{ResponseBody, full_body, make_boxed_error_response};
use shared::{counter, histogram};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Index,
    Robots,
    Sitemap,
    DefaultRedirect,
    Redirect,
    CampaignHome,
    BridgePage,
    ReviewPage,
}

impl Action {
    const fn as_str(&self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::Robots => "robots",
            Action::Sitemap => "sitemap",
            Action::DefaultRedirect => "default_redirect",
            Action::Redirect => "redirect",
            Action::CampaignHome => "campaign_home",
            Action::BridgePage => "bridge_page",
            Action::ReviewPage => "review_page",
        }
    }
}

fn route_table() -> RouteTable<Action> {
    RouteTable::new(vec![
        Route::new("/", Action::Index),
        Route::new("/robots.txt", Action::Robots),
        Route::new("/sitemap.xml", Action::Sitemap),
        Route::new("/go", Action::DefaultRedirect),
        Route::new("/api/go/{campaign}", Action::Redirect),
        Route::new("/campaigns/{campaign}", Action::CampaignHome),
        Route::new("/campaigns/{campaign}/{locale}", Action::BridgePage),
        Route::new("/campaigns/{campaign}/{locale}/review", Action::ReviewPage),
    ])
}

/// Public site service: cloak redirects, locale pages and crawler documents.
pub struct CloakService {
    registry: Arc<CampaignRegistry>,
    routes: RouteTable<Action>,
    default_campaign: Option<String>,
    robots_txt: Bytes,
    sitemap_xml: Bytes,
}

impl CloakService {
    pub fn new(config: &Config, registry: Arc<CampaignRegistry>) -> Self {
        let robots_txt = Bytes::from(robots_txt(config));
        let sitemap_xml = Bytes::from(sitemap_xml(config, &registry));
        Self {
            registry,
            routes: route_table(),
            default_campaign: config.default_campaign.clone(),
            robots_txt,
            sitemap_xml,
        }
    }

    /// Builds the response for a request. Never fails: every resolution error
    /// is turned into a redirect to the site root or a 404 here.
    pub fn handle<B>(&self, request: &Request<B>) -> Response<ResponseBody> {
        let start = Instant::now();
        let (route, response) = self.dispatch(request);
        histogram!(
            REQUEST_DURATION,
            "route" => route,
            "status" => response.status().as_u16().to_string()
        )
        .record(start.elapsed().as_secs_f64());
        response
    }

    fn dispatch<B>(&self, request: &Request<B>) -> (&'static str, Response<ResponseBody>) {
        let Some(route_match) = self.routes.resolve(request) else {
            return ("unmatched", make_boxed_error_response(StatusCode::NOT_FOUND));
        };
        let action = *route_match.action;

        if !matches!(*request.method(), Method::GET | Method::HEAD) {
            let mut response = make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED);
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            return (action.as_str(), response);
        }

        let params = &route_match.params;
        let response = match action {
            Action::Index => json_response(&site_index(&self.registry)),
            Action::Robots => text_response("text/plain; charset=utf-8", self.robots_txt.clone()),
            Action::Sitemap => text_response("application/xml", self.sitemap_xml.clone()),
            Action::DefaultRedirect => {
                self.cloak_redirect(self.default_campaign.as_deref().unwrap_or_default())
            }
            Action::Redirect => self.cloak_redirect(params.get("campaign").unwrap_or_default()),
            Action::CampaignHome => self.campaign_home(params),
            Action::BridgePage => self.locale_page(params, false),
            Action::ReviewPage => self.locale_page(params, true),
        };
        (action.as_str(), response)
    }

    fn cloak_redirect(&self, campaign_id: &str) -> Response<ResponseBody> {
        let outcome = self.registry.resolve_redirect(campaign_id);
        match outcome.failure() {
            Some(failure) => counter!(REDIRECT_FALLBACK, "reason" => failure.kind()).increment(1),
            None => counter!(
                REDIRECT_RESOLVED,
                "campaign" => outcome.campaign().unwrap_or_default().to_string()
            )
            .increment(1),
        }

        let mut response = redirect_response(&outcome);
        response
            .headers_mut()
            .insert(X_ROBOTS_TAG, HeaderValue::from_static("noindex, nofollow"));
        response
    }

    fn campaign_home(&self, params: &Params<'_>) -> Response<ResponseBody> {
        let campaign_id = params.get("campaign").unwrap_or_default();
        let target = self.registry.get(campaign_id).and_then(|campaign| {
            let locale = campaign.default_locale()?;
            Some(format!("/campaigns/{}/{locale}", campaign.name()))
        });

        match target {
            Some(location) => redirect_to(StatusCode::TEMPORARY_REDIRECT, &location),
            None => not_found("NoDefaultLocale"),
        }
    }

    fn locale_page(&self, params: &Params<'_>, review: bool) -> Response<ResponseBody> {
        let campaign_id = params.get("campaign").unwrap_or_default();
        let locale = params.get("locale").unwrap_or_default();

        let (campaign, content) = match self.registry.resolve_page(campaign_id, locale) {
            Ok(found) => found,
            Err(e) => {
                tracing::info!(kind = e.kind(), error = %e, "locale page not found");
                return not_found(e.kind());
            }
        };

        let page = if review { "review" } else { "bridge" };
        let response = if review {
            match review_payload(campaign, locale, content) {
                Some(payload) => json_response(&payload),
                None => return not_found("ReviewPageNotFound"),
            }
        } else {
            json_response(&bridge_payload(campaign, locale, content))
        };

        counter!(PAGE_SERVED, "campaign" => campaign.name().to_string(), "page" => page)
            .increment(1);
        response
    }
}

impl<B> Service<Request<B>> for CloakService {
    type Response = Response<ResponseBody>;
    type Error = Infallible;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, request: Request<B>) -> Self::Future {
        let response = self.handle(&request);
        Box::pin(async move { Ok(response) })
    }
}

fn redirect_response(outcome: &RedirectOutcome) -> Response<ResponseBody> {
    redirect_to(outcome.status(), outcome.location())
}

fn redirect_to(status: StatusCode, location: &str) -> Response<ResponseBody> {
    let location = HeaderValue::from_str(location)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_LOCATION));

    let mut response = Response::new(full_body(Bytes::new()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(LOCATION, location);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn not_found(reason: &'static str) -> Response<ResponseBody> {
    counter!(PAGE_NOT_FOUND, "reason" => reason).increment(1);
    make_boxed_error_response(StatusCode::NOT_FOUND)
}

fn json_response<T: Serialize>(value: &T) -> Response<ResponseBody> {
    match serde_json::to_vec(value) {
        Ok(body) => text_response("application/json", Bytes::from(body)),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response body");
            make_boxed_error_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn text_response(content_type: &'static str, body: Bytes) -> Response<ResponseBody> {
    let mut response = Response::new(full_body(body));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
