// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact form service.
//!
//! Two front doors share one pipeline. The synchronous door answers with a
//! redirect carrying a `cf_sent` / `cf_error` flag; the asynchronous door
//! answers with `{success, data: {message}}`.

use crate::client_ip;
use crate::config::Config;
use crate::form::{render_page, FormView, Notice, AJAX_ACTION};
use crate::metrics::Metrics;
use crate::pipeline::{Channel, Outcome, SubmissionHandler, GENERIC_ERROR_MESSAGE};
use crate::nonce::FORM_ACTION;
use crate::submission::FormFields;
use axum::{
    extract::{rejection::FormRejection, ConnectInfo, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};
use url::Url;

/// Query flags set by the synchronous redirect.
const SENT_FLAG: &str = "cf_sent";
const ERROR_FLAG: &str = "cf_error";

/// `cf_error` value for a body that could not be read as a form. It has no
/// reason-specific notice, so the page shows the generic error.
pub const INVALID_REQUEST_CODE: &str = "invalid_request";

/// Shared application state.
pub struct AppState {
    pub handler: SubmissionHandler,
    pub metrics: Metrics,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Flags read when rendering the form page.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    #[serde(default)]
    pub cf_sent: Option<String>,
    #[serde(default)]
    pub cf_error: Option<String>,
}

/// Asynchronous submission response body.
#[derive(Debug, Serialize)]
pub struct AjaxResponse {
    pub success: bool,
    pub data: AjaxData,
}

#[derive(Debug, Serialize)]
pub struct AjaxData {
    pub message: &'static str,
}

impl AjaxResponse {
    fn failure(message: &'static str) -> Self {
        Self {
            success: false,
            data: AjaxData { message },
        }
    }

    fn from_outcome(outcome: &Outcome) -> Self {
        Self {
            success: outcome.reports_success(),
            data: AjaxData {
                message: outcome.user_message(),
            },
        }
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let form_path = state.config.site.form_path.clone();
    let ajax_path = state.config.site.ajax_path.clone();
    let metrics_path = state
        .config
        .metrics
        .enabled
        .then(|| state.config.metrics.path.clone());

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route(&form_path, get(show_form).post(submit_form))
        .route(&ajax_path, post(submit_ajax));

    if let Some(path) = metrics_path {
        router = router.route(&path, get(metrics));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-form",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Render the form, with a notice when the query carries a result flag.
pub async fn show_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NoticeQuery>,
) -> Html<String> {
    let notice = Notice::from_query(query.cf_sent.as_deref(), query.cf_error.as_deref());
    Html(form_page(&state, notice))
}

/// Synchronous (page reload) submission.
///
/// A POST without the submit button is not a submission and just renders
/// the form again.
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    form: Result<Form<FormFields>, FormRejection>,
) -> Response {
    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable synchronous submission");
            let location = redirect_location(
                &headers,
                &state.config.site.form_path,
                (ERROR_FLAG, INVALID_REQUEST_CODE),
            );
            return Redirect::to(&location).into_response();
        }
    };

    if fields.nc_form_submit.is_none() {
        debug!("POST without submit button, rendering form");
        return Html(form_page(&state, None)).into_response();
    }

    let ip = client_ip::resolve(
        &headers,
        connect_info.map(|ConnectInfo(addr)| addr),
        state.config.site.trust_proxy_headers,
    );
    let outcome = state.handler.process(&fields, ip, Channel::Sync).await;
    state.metrics.record(Channel::Sync, &outcome);

    // Bots get the same flag as a real success.
    let flag = match outcome {
        Outcome::Accepted | Outcome::Absorbed => (SENT_FLAG, "1"),
        Outcome::Rejected(err) => (ERROR_FLAG, err.code()),
    };

    let location = redirect_location(&headers, &state.config.site.form_path, flag);
    Redirect::to(&location).into_response()
}

/// Asynchronous (no reload) submission.
pub async fn submit_ajax(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    form: Result<Form<FormFields>, FormRejection>,
) -> (StatusCode, Json<AjaxResponse>) {
    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable asynchronous submission");
            return (
                StatusCode::OK,
                Json(AjaxResponse::failure(GENERIC_ERROR_MESSAGE)),
            );
        }
    };

    if fields.action.as_deref() != Some(AJAX_ACTION) {
        warn!(action = ?fields.action, "Unknown asynchronous action");
        return (
            StatusCode::BAD_REQUEST,
            Json(AjaxResponse::failure(GENERIC_ERROR_MESSAGE)),
        );
    }

    let ip = client_ip::resolve(
        &headers,
        connect_info.map(|ConnectInfo(addr)| addr),
        state.config.site.trust_proxy_headers,
    );
    let outcome = state.handler.process(&fields, ip, Channel::Async).await;
    state.metrics.record(Channel::Async, &outcome);

    (StatusCode::OK, Json(AjaxResponse::from_outcome(&outcome)))
}

/// Prometheus exposition endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn form_page(state: &AppState, notice: Option<Notice>) -> String {
    let token = state.handler.nonces().create(FORM_ACTION);
    render_page(&FormView {
        site_name: &state.config.site.site_name,
        form_path: &state.config.site.form_path,
        ajax_path: &state.config.site.ajax_path,
        token: &token,
        notice,
    })
}

/// Where to send the browser after a synchronous submission.
///
/// The `Referer` is only followed when it is an http(s) URL on the host
/// the request was made to; otherwise the form path is used. Any earlier
/// `cf_sent` / `cf_error` flags are dropped before `flag` is appended.
pub fn redirect_location(headers: &HeaderMap, fallback_path: &str, flag: (&str, &str)) -> String {
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());

    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Url::parse(v).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| host.is_some_and(|h| same_authority(url, h)));

    if let Some(url) = referer {
        return with_flag(url, flag).to_string();
    }

    // Resolve the fallback against a placeholder origin, then keep only the
    // path and query so the redirect stays relative.
    match Url::parse("http://localhost/").and_then(|base| base.join(fallback_path)) {
        Ok(url) => {
            let url = with_flag(url, flag);
            match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            }
        }
        Err(_) => fallback_path.to_string(),
    }
}

fn same_authority(url: &Url, host_header: &str) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let authority = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    authority.eq_ignore_ascii_case(host_header.trim())
}

fn with_flag(mut url: Url, (key, value): (&str, &str)) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != SENT_FLAG && k != ERROR_FLAG)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(key, value);
    }
    url
}
