//! Fixed-window rate limiting keyed by client address.
//!
//! Windows are aligned to the instant the limiter was created: window `k`
//! covers `[epoch + k * window, epoch + (k + 1) * window)`. Every client's
//! quota resets together when a new window starts.

use crate::metrics::{Metrics, Outcome};
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

const TOO_MANY_REQUESTS: &str = "Too many requests from this IP, please try again later.";

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    epoch: Instant,
    counters: Mutex<WindowCounters>,
}

#[derive(Debug, Default)]
struct WindowCounters {
    window: u128,
    counts: HashMap<IpAddr, u32>,
}

/// The verdict for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32, reset_after: Duration },
    Limited { retry_after: Duration },
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::starting_at(max_requests, window, Instant::now())
    }

    /// Create a limiter whose first window opens at `epoch`.
    pub fn starting_at(max_requests: u32, window: Duration, epoch: Instant) -> Self {
        Self {
            max_requests,
            window: window.max(Duration::from_millis(1)),
            epoch,
            counters: Mutex::new(WindowCounters::default()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Count a request from `client` against the current window.
    pub fn check(&self, client: IpAddr) -> RateLimitDecision {
        self.check_at(client, Instant::now())
    }

    /// Count a request from `client` made at `now`. Rejected requests do not
    /// use up quota.
    pub fn check_at(&self, client: IpAddr, now: Instant) -> RateLimitDecision {
        let window_nanos = self.window.as_nanos();
        let elapsed = now.saturating_duration_since(self.epoch).as_nanos();
        let window = elapsed / window_nanos;
        let reset_after = nanos_to_duration(window_nanos - elapsed % window_nanos);

        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        if counters.window != window {
            counters.window = window;
            counters.counts.clear();
        }

        let count = counters.counts.entry(client).or_insert(0);
        if *count >= self.max_requests {
            return RateLimitDecision::Limited {
                retry_after: reset_after,
            };
        }

        *count += 1;
        RateLimitDecision::Allowed {
            remaining: self.max_requests - *count,
            reset_after,
        }
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Middleware rejecting clients that used up their quota before the request
/// reaches the handler.
#[tracing::instrument(name = "Apply rate limit", skip_all, fields(client = %addr.ip()))]
pub async fn rate_limit<B>(
    State(limiter): State<Arc<RateLimiter>>,
    State(metrics): State<Arc<Metrics>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    match limiter.check(addr.ip()) {
        RateLimitDecision::Allowed {
            remaining,
            reset_after,
        } => {
            let mut response = next.run(request).await;
            insert_headers(
                response.headers_mut(),
                limiter.max_requests(),
                remaining,
                reset_after,
            );
            response
        }
        RateLimitDecision::Limited { retry_after } => {
            tracing::warn!("Client exceeded the contact rate limit");
            metrics.record(Outcome::RateLimited);

            let mut response = (StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS).into_response();
            let headers = response.headers_mut();
            insert_headers(headers, limiter.max_requests(), 0, retry_after);
            headers.insert(http::header::RETRY_AFTER, seconds(retry_after));
            response
        }
    }
}

fn insert_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_after: Duration) {
    headers.insert("ratelimit-limit", HeaderValue::from(limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(remaining));
    headers.insert("ratelimit-reset", seconds(reset_after));
}

/// Whole seconds, rounded up so clients never retry too early.
fn seconds(duration: Duration) -> HeaderValue {
    let mut secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs += 1;
    }
    HeaderValue::from(secs)
}
