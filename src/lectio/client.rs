// src/lectio/client.rs
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, redirect, StatusCode};

use crate::utils::error::PortalError;

const LECTIO_BASE: &str = "https://www.lectio.dk";
const LECTIO_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:141.0) Gecko/20100101 Firefox/141.0";

/// Pages larger than this never reach the extractor.
pub const DEFAULT_MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;

// The login page is served with 200 when the session has lapsed.
static LOGIN_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)unilogin|log\s*ind").expect("Failed to compile LOGIN_MARKER_RE")
});

static ROBOT_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)robot|captcha|anti-bot|bot-protection").expect("Failed to compile ROBOT_MARKER_RE")
});

/// Everything needed to fetch one week's schedule page.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub gym_id: String,
    /// Portal week parameter, e.g. `102024`; the portal's current week when absent.
    pub week: Option<String>,
    /// Value of the `autologinkeyV2` cookie.
    pub cookie: String,
    /// Optional `ASP.NET_SessionId`.
    pub session: Option<String>,
    pub max_page_bytes: usize,
}

impl ScheduleRequest {
    /// Constructs the URL of the schedule page for this request.
    pub fn url(&self) -> String {
        match &self.week {
            Some(week) => format!("{}/lectio/{}/SkemaNy.aspx?week={}", LECTIO_BASE, self.gym_id, week),
            None => format!("{}/lectio/{}/SkemaNy.aspx", LECTIO_BASE, self.gym_id),
        }
    }

    /// Builds the `Cookie` header, rejecting values that cannot travel in a header.
    pub fn cookie_header(&self) -> Result<String, PortalError> {
        validate_credential("cookie", &self.cookie)?;
        let mut value = format!("autologinkeyV2={};", self.cookie);
        if let Some(session) = &self.session {
            validate_credential("session", session)?;
            value.push_str(&format!(" ASP.NET_SessionId={}; isloggedin3=Y", session));
        }
        Ok(value)
    }
}

fn validate_credential(name: &str, value: &str) -> Result<(), PortalError> {
    if value.is_empty() {
        return Err(PortalError::InvalidCredential(format!("{} is empty", name)));
    }
    if !value.chars().all(|c| (' '..='~').contains(&c)) {
        return Err(PortalError::InvalidCredential(format!(
            "{} contains characters outside printable ASCII",
            name
        )));
    }
    Ok(())
}

/// Creates a reqwest client that surfaces redirects instead of following them.
fn build_lectio_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(LECTIO_USER_AGENT)
        .redirect(redirect::Policy::none())
        .build()
}

/// Downloads the schedule page for `request`. Single attempt, no retries.
pub async fn fetch_schedule_page(request: &ScheduleRequest) -> Result<String, PortalError> {
    let cookie = request.cookie_header()?;
    let client = build_lectio_client()?;
    let url = request.url();

    tracing::info!("Fetching schedule page: {}", url);

    let response = client
        .get(&url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .header(header::ACCEPT_LANGUAGE, "da-DK,da;q=0.9,en;q=0.5")
        .header(header::COOKIE, cookie)
        .send()
        .await?;

    check_status(response.status())?;
    check_declared_length(response.content_length(), request.max_page_bytes)?;

    let body = response.text().await?;
    tracing::debug!("Downloaded {} bytes from {}", body.len(), url);

    check_body(&body, request.max_page_bytes)?;
    Ok(body)
}

fn check_status(status: StatusCode) -> Result<(), PortalError> {
    if status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::FOUND {
        tracing::warn!("Portal redirected ({}) - session not accepted", status);
        return Err(PortalError::Unauthorized);
    }
    if !status.is_success() {
        tracing::error!("HTTP error status from portal: {}", status);
        return Err(PortalError::Upstream(status));
    }
    Ok(())
}

// Refuse before buffering when the server announces an oversized body.
fn check_declared_length(content_length: Option<u64>, max_page_bytes: usize) -> Result<(), PortalError> {
    match content_length {
        Some(len) if len > max_page_bytes as u64 => Err(PortalError::TooLarge(len as usize)),
        _ => Ok(()),
    }
}

fn check_body(body: &str, max_page_bytes: usize) -> Result<(), PortalError> {
    if body.len() > max_page_bytes {
        return Err(PortalError::TooLarge(body.len()));
    }
    if LOGIN_MARKER_RE.is_match(body) {
        tracing::warn!("Portal returned a login page - session expired");
        return Err(PortalError::Unauthorized);
    }
    if ROBOT_MARKER_RE.is_match(body) {
        return Err(PortalError::RobotDetected);
    }
    Ok(())
}
