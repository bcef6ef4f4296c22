use crate::http::{ResponseBody, full_body, make_boxed_error_response};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

/// Liveness and readiness endpoints served on the admin listener.
pub struct AdminService<F> {
    is_ready: F,
}

impl<F> AdminService<F>
where
    F: Fn() -> bool,
{
    pub fn new(is_ready: F) -> Self {
        Self { is_ready }
    }
}

impl<F, B> Service<Request<B>> for AdminService<F>
where
    F: Fn() -> bool,
{
    type Response = Response<ResponseBody>;
    type Error = Infallible;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let is_ready = (self.is_ready)();

        let res = match req.uri().path() {
            "/health" => Response::new(full_body("ok\n")),
            "/ready" => match is_ready {
                true => Response::new(full_body("ok\n")),
                false => make_boxed_error_response(StatusCode::SERVICE_UNAVAILABLE),
            },
            _ => make_boxed_error_response(StatusCode::NOT_FOUND),
        };

        Box::pin(async move { Ok(res) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_admin_endpoints() {
        let ready = AdminService::new(|| true);
        assert_eq!(ready.call(get("/health")).await.unwrap().status(), StatusCode::OK);
        assert_eq!(ready.call(get("/ready")).await.unwrap().status(), StatusCode::OK);
        assert_eq!(
            ready.call(get("/other")).await.unwrap().status(),
            StatusCode::NOT_FOUND
        );

        let not_ready = AdminService::new(|| false);
        assert_eq!(
            not_ready.call(get("/health")).await.unwrap().status(),
            StatusCode::OK
        );
        assert_eq!(
            not_ready.call(get("/ready")).await.unwrap().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
