//! HTTP route handlers

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Html,
    Json,
};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};

use super::AppState;
use crate::db::{DayCount, PageStat, PageviewEvent, Site, SiteStats};
use crate::error::{AppError, AppResult};
use crate::session;

const TOP_PAGES_LIMIT: i32 = 10;

/// Serve the dashboard page
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// Serve the tracking script embedded by tracked pages
pub async fn tracking_script() -> ([(header::HeaderName, &'static str); 1], &'static str) {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        include_str!("../../static/script.js"),
    )
}

/// Get the real client IP address, checking proxy headers first
/// Priority: X-Real-IP > X-Forwarded-For (first IP) > ConnectInfo
fn get_real_ip(headers: &HeaderMap, fallback_ip: &str) -> String {
    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip) = real_ip.to_str() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(ips) = forwarded.to_str() {
            if let Some(first_ip) = ips.split(',').next() {
                let ip = first_ip.trim();
                if !ip.is_empty() {
                    return ip.to_string();
                }
            }
        }
    }

    fallback_ip.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub site_id: Option<String>,
    pub path: Option<String>,
}

/// API: Record a pageview beacon
///
/// The body is parsed from raw bytes rather than the `Json` extractor:
/// `navigator.sendBeacon` payloads arrive without an application/json
/// content type. Responses carry no body either way, the beacon sender
/// never reads them.
pub async fn api_track(
    State(state): State<Arc<AppState>>,
    addr: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Ok(beacon) = serde_json::from_slice::<TrackRequest>(&body) else {
        return StatusCode::BAD_REQUEST;
    };
    let Some(site_id) = beacon.site_id.filter(|s| !s.is_empty()) else {
        return StatusCode::BAD_REQUEST;
    };
    let path = beacon
        .path
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "/".to_string());

    let fallback_ip = addr
        .map(|ConnectInfo(a)| a.ip().to_string())
        .unwrap_or_else(|| session::UNKNOWN_ADDR.to_string());
    let ip = get_real_ip(&headers, &fallback_ip);

    let event = PageviewEvent::new(site_id, session::fingerprint_today(&ip), path);
    match state.db.insert_event(&event).await {
        Ok(_) => {
            tracing::info!("Pageview {} for site {}", event.path, event.site_id);
            StatusCode::NO_CONTENT
        }
        Err(e) => {
            tracing::error!("Failed to store pageview: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// API: List all registered sites, newest first
pub async fn api_list_sites(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Site>>> {
    let sites = state.db.list_sites().await?;
    Ok(Json(sites))
}

#[derive(Debug, Deserialize)]
pub struct CreateSiteRequest {
    pub name: Option<String>,
    pub domain: Option<String>,
}

/// API: Register a new site
pub async fn api_create_site(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSiteRequest>,
) -> AppResult<(StatusCode, Json<Site>)> {
    let name = req
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;
    let domain = req
        .domain
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::Validation("domain is required".to_string()))?;

    let site = Site::new(name, domain);
    state.db.insert_site(&site).await?;
    tracing::info!("Registered site {} ({})", site.name, site.id);

    Ok((StatusCode::CREATED, Json(site)))
}

/// API: All-time visitor and view counts for one site
pub async fn api_site_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<SiteStats>> {
    let stats = state.db.get_site_stats(&id).await?;
    Ok(Json(stats))
}

/// API: Daily pageview counts, 30 most recent days, oldest first
pub async fn api_site_timeseries(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<DayCount>>> {
    let series = state.db.get_timeseries(&id).await?;
    Ok(Json(series))
}

/// API: Most-viewed pages for one site, top 10
pub async fn api_site_pages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<PageStat>>> {
    let pages = state.db.get_top_pages(&id, TOP_PAGES_LIMIT).await?;
    Ok(Json(pages))
}
