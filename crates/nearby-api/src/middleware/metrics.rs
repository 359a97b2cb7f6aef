//! Metrics tracking middleware
//!
//! Tracks request latency, counts, status codes, and authentication outcomes
//! in a process-wide Prometheus registry.
//!
//! Author: hephaex@gmail.com

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{
    histogram_opts, opts, Encoder, HistogramVec, IntCounterVec, Registry, TextEncoder,
};
use std::time::Instant;

struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration: HistogramVec,
    auth_events_total: IntCounterVec,
}

impl Metrics {
    fn build() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("nearby".to_string()), None)?;

        let http_requests_total = IntCounterVec::new(
            opts!("http_requests_total", "HTTP requests by endpoint and status"),
            &["endpoint", "status"],
        )?;
        let http_request_duration = HistogramVec::new(
            histogram_opts!(
                "http_request_duration_seconds",
                "HTTP request latency",
                vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
            ),
            &["endpoint"],
        )?;
        let auth_events_total = IntCounterVec::new(
            opts!("auth_events_total", "Authentication outcomes by event"),
            &["event"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;
        registry.register(Box::new(auth_events_total.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration,
            auth_events_total,
        })
    }
}

lazy_static! {
    static ref METRICS: Option<Metrics> = match Metrics::build() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build metrics registry; metrics disabled");
            None
        }
    };
}

/// Authentication outcome counted in `auth_events_total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    UserLogin,
    AdminLogin,
    LoginRejected,
    Logout,
    LogoutRejected,
    Refresh,
    RefreshRejected,
}

impl AuthEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEvent::UserLogin => "user_login",
            AuthEvent::AdminLogin => "admin_login",
            AuthEvent::LoginRejected => "login_rejected",
            AuthEvent::Logout => "logout",
            AuthEvent::LogoutRejected => "logout_rejected",
            AuthEvent::Refresh => "refresh",
            AuthEvent::RefreshRejected => "refresh_rejected",
        }
    }
}

pub fn record_auth_event(event: AuthEvent) {
    if let Some(metrics) = METRICS.as_ref() {
        metrics
            .auth_events_total
            .with_label_values(&[event.as_str()])
            .inc();
    }
}

/// Render the registry in the Prometheus text exposition format
pub fn render() -> Result<String, prometheus::Error> {
    let families = METRICS
        .as_ref()
        .map(|metrics| metrics.registry.gather())
        .unwrap_or_default();

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Metrics tracking middleware
///
/// Labels by matched route template so unknown paths collapse into one series.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    if let Some(metrics) = METRICS.as_ref() {
        let status = response.status().as_u16().to_string();
        metrics
            .http_requests_total
            .with_label_values(&[&endpoint, &status])
            .inc();
        metrics
            .http_request_duration
            .with_label_values(&[&endpoint])
            .observe(start.elapsed().as_secs_f64());
    }

    response
}
