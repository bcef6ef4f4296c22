use std::collections::HashMap;

#[derive(Debug)]
enum PathSegment {
    Static(String),
    Param(String),
}

#[derive(Debug)]
struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Parses a path template such as "/campaigns/{campaign}/{locale}".
    /// Segments wrapped in braces capture one request segment each.
    pub fn parse(path_str: &str) -> Self {
        let normalized_path = path_str.trim().trim_matches('/');

        let segments: Vec<PathSegment> = if normalized_path.is_empty() {
            vec![]
        } else {
            normalized_path
                .split('/')
                .map(|s| {
                    if let Some(stripped) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                        PathSegment::Param(stripped.to_string())
                    } else {
                        PathSegment::Static(s.to_string())
                    }
                })
                .collect()
        };

        Path { segments }
    }

    /// Matches a request path against this template.
    /// Segments are compared verbatim; no percent-decoding is applied, so an
    /// encoded segment never matches a static one.
    fn matches<'a>(&self, request_path: &'a str) -> Option<Params<'a>> {
        let normalized_path = request_path.trim_matches('/');

        let request_segments: Vec<&'a str> = if normalized_path.is_empty() {
            vec![]
        } else {
            normalized_path.split('/').collect()
        };

        if request_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (seg, req_segment) in self.segments.iter().zip(request_segments) {
            match seg {
                PathSegment::Static(s) => {
                    if req_segment != s {
                        return None;
                    }
                }
                PathSegment::Param(name) => {
                    // Empty captures ("/a//b") never match
                    if req_segment.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), req_segment);
                }
            }
        }

        Some(Params(params))
    }
}

/// Segments captured by a matched template, keyed by parameter name.
#[derive(Debug, Default, PartialEq)]
pub struct Params<'a>(HashMap<String, &'a str>);

impl<'a> Params<'a> {
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.0.get(name).copied()
    }
}

#[derive(Debug, PartialEq)]
pub struct RouteMatch<'a, A> {
    pub params: Params<'a>,
    pub action: &'a A,
}

#[derive(Debug)]
pub struct Route<A> {
    path: Path,
    action: A,
}

impl<A> Route<A> {
    pub fn new(path: &str, action: A) -> Self {
        Self {
            path: Path::parse(path),
            action,
        }
    }

    /// Returns Some(RouteMatch) if the path matches this route, None otherwise.
    /// Leading and trailing slashes are ignored on both sides.
    pub fn matches<'a>(&'a self, request_path: &'a str) -> Option<RouteMatch<'a, A>> {
        let params = self.path.matches(request_path)?;
        Some(RouteMatch {
            params,
            action: &self.action,
        })
    }
}

/// Ordered list of routes; the first match wins.
#[derive(Debug)]
pub struct RouteTable<A> {
    routes: Vec<Route<A>>,
}

impl<A> RouteTable<A> {
    pub fn new(routes: Vec<Route<A>>) -> Self {
        Self { routes }
    }

    /// Matches the request path to a route, ignoring the query string.
    pub fn resolve<'a, B>(&'a self, request: &'a http::Request<B>) -> Option<RouteMatch<'a, A>> {
        self.resolve_path(request.uri().path())
    }

    pub fn resolve_path<'a>(&'a self, path: &'a str) -> Option<RouteMatch<'a, A>> {
        self.routes.iter().find_map(|route| route.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path() {
        let route = Route::new("/", "index");
        assert!(route.matches("/").is_some());
        assert!(route.matches("").is_some());
        assert!(route.matches("/robots.txt").is_none());
    }

    #[test]
    fn test_static_path() {
        let route = Route::new("/api/go/", "go");
        assert!(route.matches("/api/go").is_some(), "exact path");
        assert!(
            route.matches("/api/go/").is_some(),
            "with trailing slash normalization"
        );
        assert!(
            route.matches("/api/go/mitolyn").is_none(),
            "extra segment doesn't match"
        );
        assert!(route.matches("/api/").is_none(), "missing segment");
    }

    #[test]
    fn test_dynamic_path() {
        let route = Route::new("/campaigns/{campaign}/{locale}", "page");

        let route_match = route.matches("/campaigns/mitolyn/pt-BR").unwrap();
        assert_eq!(route_match.params.get("campaign"), Some("mitolyn"));
        assert_eq!(route_match.params.get("locale"), Some("pt-BR"));
        assert_eq!(route_match.params.get("missing"), None);
        assert_eq!(route_match.action, &"page");

        assert!(route.matches("/campaigns/mitolyn").is_none());
        assert!(route.matches("/campaigns//pt-BR").is_none());
        assert!(route.matches("/campaigns/mitolyn/pt-BR/review").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new(vec![
            Route::new("/go", "default"),
            Route::new("/{anything}", "catch"),
        ]);
        assert_eq!(table.resolve_path("/go").unwrap().action, &"default");
        assert_eq!(table.resolve_path("/other").unwrap().action, &"catch");
        assert!(table.resolve_path("/a/b").is_none());
    }

    #[test]
    fn test_resolve_ignores_query() {
        let table = RouteTable::new(vec![Route::new("/api/go/{campaign}", "go")]);
        let request = http::Request::builder()
            .uri("/api/go/mitolyn?to=https://evil.example")
            .body(())
            .unwrap();

        let route_match = table.resolve(&request).unwrap();
        assert_eq!(route_match.params.get("campaign"), Some("mitolyn"));
    }

    #[test]
    fn test_path_parsing() {
        assert_eq!(Path::parse("").segments.len(), 0);
        assert_eq!(Path::parse("/api/go").segments.len(), 2);
        let path = Path::parse("/api/go/{campaign}");
        assert_eq!(path.segments.len(), 3);
        assert!(matches!(&path.segments[2], PathSegment::Param(name) if name == "campaign"));
    }
}
