//! HTTP request handlers.

use super::AppState;
use crate::core::{
    build_badge, can_add_monitor, classify_certificate_expiry, classify_uptime, densify,
    effective_theme, resolve_policy, set_owner_default, set_viewer_override, status_code_label,
    summarize, BadgeError, BadgePeriod, CertBand, DailyAggregate, SeriesSummary, Theme, UptimeBand,
    clear_viewer_override, validate_check_interval,
};
use crate::db::{DailyUptimeRow, DbError, Monitor};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::OnceLock;

// ============================================================================
// Templates (simple string replacement)
// ============================================================================

const LAYOUT_TEMPLATE: &str = include_str!("templates/layout.html");
const STATUS_TEMPLATE: &str = include_str!("templates/status.html");

const ANONYMOUS_VIEWER: &str = "anonymous";

fn slug_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap())
}

// ============================================================================
// Status pages
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ViewerQuery {
    #[serde(default)]
    pub viewer: Option<String>,
}

pub async fn handle_status_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> impl IntoResponse {
    let monitor = match state.store.get_monitor_by_slug(&slug) {
        Ok(m) => m,
        Err(_) => return Html("<h1>Status page not found</h1>".to_string()).into_response(),
    };

    let viewer = query.viewer.as_deref().unwrap_or(ANONYMOUS_VIEWER);
    let theme = effective_theme(&state.store.themes_for(viewer), &slug).unwrap_or(Theme::DEFAULT);

    let content = STATUS_TEMPLATE
        .replace("{{app_name}}", &monitor.app_name)
        .replace("{{slug}}", &monitor.slug)
        .replace("{{theme}}", theme.as_str());

    let page = LAYOUT_TEMPLATE
        .replace("{{title}}", &format!("{} Status", monitor.app_name))
        .replace("{{theme}}", theme.as_str())
        .replace("{{content}}", &content);

    Html(page).into_response()
}

// ============================================================================
// API: Status
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HistoryDay {
    pub date: NaiveDate,
    pub is_monitored: bool,
    pub uptime_percentage: f64,
    pub total_checks: i64,
    pub successful_checks: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<UptimeBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_label: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct LivePart {
    pub status_code: u16,
    pub status: &'static str,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_band: Option<CertBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_days_remaining: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub app_name: String,
    pub slug: String,
    pub theme: Theme,
    pub retention_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<LivePart>,
    pub uptime_history: Vec<HistoryDay>,
    pub summary: SeriesSummary,
}

pub async fn handle_api_status(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> impl IntoResponse {
    let monitor = match state.store.get_monitor_by_slug(&slug) {
        Ok(m) => m,
        Err(_) => return (StatusCode::NOT_FOUND, "Monitor not found").into_response(),
    };

    let plan = state
        .store
        .get_account(monitor.account_id)
        .map(|a| a.plan)
        .unwrap_or_default();
    let policy = resolve_policy(&plan);

    let today = Utc::now().date_naive();
    let since = today - ChronoDuration::days(policy.retention_days as i64 - 1);

    let raw = match state.store.get_daily_uptime(monitor.id, since) {
        Ok(rows) => rows.iter().map(row_to_aggregate).collect::<Vec<_>>(),
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    let days = densify(&raw, policy.retention_days, today);
    let summary = summarize(&days);

    let uptime_history: Vec<HistoryDay> = days
        .into_iter()
        .map(|d| {
            let band = d.is_monitored.then(|| classify_uptime(d.uptime_percentage));
            HistoryDay {
                band,
                band_label: band.map(|b| b.label()),
                date: d.date,
                is_monitored: d.is_monitored,
                uptime_percentage: d.uptime_percentage,
                total_checks: d.total_checks,
                successful_checks: d.successful_checks,
            }
        })
        .collect();

    let live = state
        .store
        .get_live_status(monitor.id)
        .ok()
        .flatten()
        .map(|s| LivePart {
            status_code: s.status_code,
            status: status_code_label(s.status_code),
            checked_at: s.checked_at,
            ssl_band: classify_certificate_expiry(s.ssl_days_remaining),
            ssl_days_remaining: s.ssl_days_remaining,
        });

    let viewer = query.viewer.as_deref().unwrap_or(ANONYMOUS_VIEWER);
    let theme = effective_theme(&state.store.themes_for(viewer), &slug).unwrap_or(Theme::DEFAULT);

    Json(StatusResponse {
        app_name: monitor.app_name,
        slug: monitor.slug,
        theme,
        retention_days: policy.retention_days,
        live,
        uptime_history,
        summary,
    })
    .into_response()
}

fn row_to_aggregate(row: &DailyUptimeRow) -> DailyAggregate {
    DailyAggregate {
        date: row.date,
        total_checks: row.total_checks,
        successful_checks: row.successful_checks,
        uptime_percentage: if row.total_checks > 0 {
            row.successful_checks as f64 / row.total_checks as f64 * 100.0
        } else {
            0.0
        },
    }
}

// ============================================================================
// API: Themes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateOwnerThemeRequest {
    pub theme: String,
    pub account_id: i64,
    #[serde(default)]
    pub viewer: Option<String>,
}

pub async fn handle_update_owner_theme(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<UpdateOwnerThemeRequest>,
) -> impl IntoResponse {
    let theme: Theme = match req.theme.parse() {
        Ok(t) => t,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("{}", e)).into_response(),
    };

    let monitor = match state.store.get_monitor_by_slug(&slug) {
        Ok(m) => m,
        Err(_) => return (StatusCode::NOT_FOUND, "Monitor not found").into_response(),
    };
    if monitor.account_id != req.account_id {
        return (StatusCode::FORBIDDEN, "Not the owner of this monitor").into_response();
    }

    // The owner's own override must not outlive the new default.
    let viewer = req
        .viewer
        .unwrap_or_else(|| format!("account-{}", req.account_id));
    let mut themes = state.store.themes_for(&viewer);
    match set_owner_default(&mut themes, &slug, theme) {
        Ok(()) => Json(json!({ "success": true, "theme": theme })).into_response(),
        Err(DbError::NotFound) => (StatusCode::NOT_FOUND, "Monitor not found").into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ViewerThemeRequest {
    pub theme: String,
    pub viewer: String,
}

pub async fn handle_set_viewer_theme(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<ViewerThemeRequest>,
) -> impl IntoResponse {
    let theme: Theme = match req.theme.parse() {
        Ok(t) => t,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("{}", e)).into_response(),
    };

    let mut themes = state.store.themes_for(&req.viewer);
    match set_viewer_override(&mut themes, &slug, theme) {
        Ok(()) => Json(json!({ "success": true, "theme": theme })).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ClearThemeQuery {
    pub viewer: String,
}

pub async fn handle_clear_viewer_theme(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ClearThemeQuery>,
) -> impl IntoResponse {
    let mut themes = state.store.themes_for(&query.viewer);
    match clear_viewer_override(&mut themes, &slug) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// ============================================================================
// API: Plan features and quota
// ============================================================================

pub async fn handle_plan_features(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> impl IntoResponse {
    let account = match state.store.get_account(account_id) {
        Ok(a) => a,
        Err(_) => return (StatusCode::NOT_FOUND, "Account not found").into_response(),
    };
    let policy = resolve_policy(&account.plan);
    let app_count = state.store.monitor_count(account_id).unwrap_or(0);

    Json(json!({
        "plan": policy.tier,
        "max_monitors": policy.max_monitors,
        "min_check_interval": policy.min_check_interval_secs,
        "retention_days": policy.retention_days,
        "badge_periods": policy.badge_periods,
        "webhooks": policy.webhooks_enabled,
        "custom_domain": policy.custom_domain_enabled,
        "api_access": policy.api_access_enabled,
        "email_alerts": policy.email_alerts_enabled,
        "max_alerts_per_day": policy.max_alerts_per_day,
        "current_app_count": app_count,
        "remaining_monitors": policy.max_monitors - app_count,
    }))
    .into_response()
}

pub async fn handle_can_add_monitor(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> impl IntoResponse {
    let account = match state.store.get_account(account_id) {
        Ok(a) => a,
        Err(_) => return (StatusCode::NOT_FOUND, "Account not found").into_response(),
    };
    let policy = resolve_policy(&account.plan);
    let app_count = state.store.monitor_count(account_id).unwrap_or(0);

    Json(json!({
        "can_add": can_add_monitor(&policy, app_count),
        "plan": policy.tier,
        "plan_limit": policy.max_monitors,
        "app_count": app_count,
        "remaining": policy.max_monitors - app_count,
    }))
    .into_response()
}

// ============================================================================
// API: Monitors
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateMonitorRequest {
    pub account_id: i64,
    pub app_name: String,
    pub slug: String,
    pub health_url: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub check_interval_secs: Option<u32>,
}

pub async fn handle_create_monitor(
    State(state): State<AppState>,
    Json(req): Json<CreateMonitorRequest>,
) -> impl IntoResponse {
    if !slug_pattern().is_match(&req.slug) || req.slug.len() < 3 || req.slug.len() > 50 {
        return (StatusCode::BAD_REQUEST, "Invalid slug").into_response();
    }
    if !req.health_url.starts_with("http://") && !req.health_url.starts_with("https://") {
        return (StatusCode::BAD_REQUEST, "Health URL must start with http:// or https://")
            .into_response();
    }

    let theme = match req.theme.as_deref() {
        Some(s) => match s.parse::<Theme>() {
            Ok(t) => t,
            Err(e) => return (StatusCode::BAD_REQUEST, format!("{}", e)).into_response(),
        },
        None => Theme::DEFAULT,
    };

    let account = match state.store.get_account(req.account_id) {
        Ok(a) => a,
        Err(_) => return (StatusCode::NOT_FOUND, "Account not found").into_response(),
    };
    let policy = resolve_policy(&account.plan);

    if let Some(interval) = req.check_interval_secs {
        if let Err(e) = validate_check_interval(&policy, interval) {
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    }

    // Quota gate: at capacity means blocked.
    let app_count = state.store.monitor_count(req.account_id).unwrap_or(0);
    if !can_add_monitor(&policy, app_count) {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "plan_limit_reached",
                "message": format!(
                    "You've reached your {} plan limit ({} monitors)",
                    policy.tier, policy.max_monitors
                ),
                "plan": policy.tier,
                "limit": policy.max_monitors,
            })),
        )
            .into_response();
    }

    let mut monitor = Monitor {
        account_id: req.account_id,
        app_name: req.app_name,
        slug: req.slug,
        health_url: req.health_url,
        theme: theme.as_str().to_string(),
        ..Default::default()
    };

    match state.store.add_monitor(&mut monitor) {
        Ok(_) => {
            tracing::info!(
                "Created monitor {} (slug={}) for account {}",
                monitor.app_name,
                monitor.slug,
                monitor.account_id
            );
            Json(monitor).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub account_id: i64,
}

pub async fn handle_delete_monitor(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> impl IntoResponse {
    let monitor = match state.store.get_monitor_by_slug(&slug) {
        Ok(m) => m,
        Err(_) => return (StatusCode::NOT_FOUND, "Monitor not found").into_response(),
    };
    if monitor.account_id != query.account_id {
        return (StatusCode::FORBIDDEN, "Not the owner of this monitor").into_response();
    }

    match state.store.delete_monitor(monitor.id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// ============================================================================
// API: Badges
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BadgeQuery {
    pub period: String,
}

pub async fn handle_badge(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<BadgeQuery>,
) -> impl IntoResponse {
    let monitor = match state.store.get_monitor_by_slug(&slug) {
        Ok(m) => m,
        Err(_) => return (StatusCode::NOT_FOUND, "Monitor not found").into_response(),
    };

    let period: BadgePeriod = match query.period.parse() {
        Ok(p) => p,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let plan = state
        .store
        .get_account(monitor.account_id)
        .map(|a| a.plan)
        .unwrap_or_default();
    let policy = resolve_policy(&plan);

    match build_badge(&state.config.public_origin, &slug, period, &policy.badge_periods) {
        Ok(artifact) => Json(artifact).into_response(),
        Err(BadgeError::InvalidPeriod(p)) => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "invalid_period",
                "message": format!("The {} period is not available on the {} plan", p, policy.tier),
                "plan": policy.tier,
                "allowed_periods": policy.badge_periods,
            })),
        )
            .into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

// ============================================================================
// Static Assets
// ============================================================================

pub async fn handle_favicon() -> impl IntoResponse {
    // Return a simple SVG favicon
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
        <circle cx="50" cy="50" r="45" fill="#0fbf6f"/>
        <path d="M20 55 L40 55 L48 30 L58 75 L66 55 L80 55" stroke="white" stroke-width="6" fill="none"/>
    </svg>"##;

    (
        [(axum::http::header::CONTENT_TYPE, "image/svg+xml")],
        svg
    )
}
