use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::rt::time::timeout;
use actix_web::{Error, ResponseError};
use std::time::{Duration, Instant};
use tracing::info;

use crate::error::AppError;

/// Upper bound on handling one request, registered with `App::app_data`.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeout(pub Duration);

impl Default for RequestTimeout {
    fn default() -> Self {
        Self(Duration::from_secs(60))
    }
}

/// Logs one line per request: version, method, path, status and latency.
///
/// The inner service is dropped once [`RequestTimeout`] elapses, which cancels any
/// in-flight store call, and the client gets a 500.
///
/// Mount with `actix_web::middleware::from_fn(log_request)`.
pub async fn log_request<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().to_string();
    let version = req.version();
    let limit = req.app_data::<RequestTimeout>().copied().unwrap_or_default().0;
    let http_req = req.request().clone();

    let res = match timeout(limit, next.call(req)).await {
        Ok(res) => res?.map_into_left_body(),
        Err(_) => ServiceResponse::new(http_req, AppError::Timeout(limit).error_response())
            .map_into_right_body(),
    };

    info!(
        "{:?} {} {} --> Status {} ({:?})",
        version,
        method,
        uri,
        res.status().as_u16(),
        start.elapsed()
    );

    Ok(res)
}
