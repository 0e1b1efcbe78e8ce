//! Liveness and readiness probes.
//!
//! Liveness answers 200 whenever a worker can serve the request. Readiness
//! answers 503 until startup has built the store pool and bound the listener.
//! Neither response may be cached.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, HttpResponseBuilder, get, http::header, web};

/// Readiness flag shared by every worker.
#[derive(Debug, Default)]
pub struct HealthState {
    ready: AtomicBool,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip readiness once the listener is bound.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

fn uncached(response: &mut HttpResponseBuilder) -> HttpResponse {
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    if state.is_ready() {
        uncached(&mut HttpResponse::Ok())
    } else {
        uncached(&mut HttpResponse::ServiceUnavailable())
    }
}

#[get("/health/live")]
pub async fn live() -> HttpResponse {
    uncached(&mut HttpResponse::Ok())
}
