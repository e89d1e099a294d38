use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, warn};

/// Log every request that ends in a 4xx (warn) or 5xx (error) together with how
/// long it took, GIF encoding of large batches can run for seconds.
pub async fn log_request_errors(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let started = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        error!(%method, path, %status, elapsed_ms, "Request failed");
    } else if status.is_client_error() {
        warn!(%method, path, %status, elapsed_ms, "Request rejected");
    }

    response
}
