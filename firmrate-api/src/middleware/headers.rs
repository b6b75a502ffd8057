/// Response header middleware
///
/// Adds security headers per OWASP recommendations plus the no-store
/// cache directives: every response carries user- or moderation-state
/// that must not be served stale from a cache.
///
/// # Headers Applied
///
/// - `Cache-Control: no-cache, no-store, must-revalidate`
/// - `Pragma: no-cache` / `Expires: 0` (legacy proxies)
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: strict-origin-when-cross-origin`
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use firmrate_api::middleware::headers::ResponseHeadersLayer;
///
/// let app: Router = Router::new().layer(ResponseHeadersLayer::new());
/// ```

use axum::{extract::Request, response::Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Response headers middleware layer
#[derive(Clone, Default)]
pub struct ResponseHeadersLayer;

impl ResponseHeadersLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for ResponseHeadersLayer {
    type Service = ResponseHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseHeadersMiddleware { inner }
    }
}

/// Response headers middleware service
#[derive(Clone)]
pub struct ResponseHeadersMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for ResponseHeadersMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;

            let headers = response.headers_mut();

            // Responses carry account and moderation state; never cache
            headers.insert(
                "Cache-Control",
                "no-cache, no-store, must-revalidate".parse().unwrap(),
            );
            headers.insert("Pragma", "no-cache".parse().unwrap());
            headers.insert("Expires", "0".parse().unwrap());

            headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());
            headers.insert("X-Frame-Options", "DENY".parse().unwrap());
            headers.insert(
                "Referrer-Policy",
                "strict-origin-when-cross-origin".parse().unwrap(),
            );

            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse, routing::get, Router};
    use tower::Service as _;

    #[tokio::test]
    async fn test_headers_applied() {
        async fn handler() -> impl IntoResponse {
            (StatusCode::OK, "test")
        }

        let mut app = Router::new()
            .route("/test", get(handler))
            .layer(ResponseHeadersLayer::new());

        let response = app
            .call(Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();

        assert_eq!(
            headers.get("Cache-Control").unwrap(),
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(headers.get("Pragma").unwrap(), "no-cache");
        assert_eq!(headers.get("Expires").unwrap(), "0");
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    }
}
