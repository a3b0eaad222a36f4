use std::future::{Ready, ready};
use std::rc::Rc;
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use futures_util::future::LocalBoxFuture;

use crate::metrics::{HTTP_REQUESTS_DURATION, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL};

/// Request count, latency and in-flight gauge per matched route.
///
/// Routes are labelled by their pattern (`/pages/{slug}`), never the raw
/// path, so label cardinality stays bounded.
pub struct RequestMetrics;

impl<S, B> Transform<S, ServiceRequest> for RequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestMetricsService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestMetricsService {
            inner: Rc::new(service),
        }))
    }
}

pub struct RequestMetricsService<S> {
    inner: Rc<S>,
}

/// Decrements the in-flight gauge even when the request future is dropped.
struct InFlight;

impl InFlight {
    fn enter() -> Self {
        HTTP_REQUESTS_IN_FLIGHT.inc();
        InFlight
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        HTTP_REQUESTS_IN_FLIGHT.dec();
    }
}

fn status_label<B>(outcome: &Result<ServiceResponse<B>, Error>) -> String {
    let status = match outcome {
        Ok(res) => res.status(),
        Err(e) => e.as_response_error().status_code(),
    };
    status.as_u16().to_string()
}

impl<S, B> Service<ServiceRequest> for RequestMetricsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(inner);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().as_str().to_owned();
        let route = req
            .match_pattern()
            .unwrap_or_else(|| "unmatched".to_owned());
        let inner = Rc::clone(&self.inner);

        Box::pin(async move {
            let _guard = InFlight::enter();
            let started = Instant::now();
            let outcome = inner.call(req).await;

            HTTP_REQUESTS_DURATION
                .with_label_values(&[&method, &route])
                .observe(started.elapsed().as_secs_f64());
            HTTP_REQUESTS_TOTAL
                .with_label_values(&[&method, &route, &status_label(&outcome)])
                .inc();

            outcome
        })
    }
}
