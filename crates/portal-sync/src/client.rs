//! # Portal Gateway & HTTP Client
//!
//! The transport capability behind the sync flows: "perform declared network
//! call, get typed response or error".
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gateway Seam                                     │
//! │                                                                         │
//! │  SyncAgent ──────► PortalGateway (trait)                               │
//! │                         │                                               │
//! │            ┌────────────┴────────────┐                                  │
//! │            ▼                         ▼                                  │
//! │   ┌────────────────┐        ┌──────────────────┐                       │
//! │   │  PortalClient  │        │  Stub gateways   │                       │
//! │   │  (reqwest)     │        │  (tests)         │                       │
//! │   │                │        │                  │                       │
//! │   │  60s timeouts  │        │  canned records, │                       │
//! │   │  no redirects  │        │  call recording  │                       │
//! │   └────────────────┘        └──────────────────┘                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The client never retries and never caches: each call is one request with
//! the caller's cookie attached, and failures map straight into the error
//! taxonomy with the failing endpoint's name attached.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::protocol::{
    into_terms, AuthResponse, ExamDto, ExamRequestBody, FinanceDto, GradeDto, ResourceDto,
    SessionDto, TermDto, Tokens,
};
use portal_core::{CourseRef, ExamRecord, FinanceRecord, GradeRecord, SessionRecord, Term};

// =============================================================================
// Endpoint Paths
// =============================================================================

/// Endpoint paths, joined against the configured base URL.
pub mod endpoints {
    pub const TOKENS: &str = "login/loader";
    pub const SIGN_IN: &str = "login/sign_in";
    pub const BOOTSTRAP: &str = "general/initialize";
    pub const TERMS: &str = "general/terms";
    pub const SESSIONS: &str = "schedule/sessions";
    pub const EXAMS: &str = "exam/schedule";
    pub const FINANCES: &str = "finance/dues";
    pub const FINANCE_SUMMARY: &str = "finance/summary";
    pub const GRADES: &str = "grade/term";
    pub const PROFILE: &str = "student/profile";
    pub const RESOURCES: &str = "course/resources";
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// The declared network calls the sync flows are built from.
///
/// One method per endpoint; every method takes the current cookie explicitly
/// so there is no hidden session state between calls. Profile and finance
/// summary return raw bodies — their historical shapes are parsed by
/// [`crate::protocol`].
#[async_trait]
pub trait PortalGateway: Send + Sync {
    /// Fetches the anti-forgery token pair. Unauthenticated.
    async fn get_tokens(&self) -> SyncResult<Tokens>;

    /// Exchanges credentials + tokens (+ optional cookie) for a session.
    async fn sign_in(
        &self,
        username: &str,
        password: &str,
        tokens: &Tokens,
        cookie: &str,
    ) -> SyncResult<AuthResponse>;

    /// The INIT flow's single bootstrap call.
    async fn bootstrap(&self, cookie: &str) -> SyncResult<()>;

    async fn get_terms(&self, cookie: &str) -> SyncResult<Vec<Term>>;

    async fn get_sessions(&self, cookie: &str) -> SyncResult<Vec<SessionRecord>>;

    async fn get_finances(&self, cookie: &str) -> SyncResult<Vec<FinanceRecord>>;

    /// Raw finance summary body; see [`crate::protocol::parse_finance_summary`].
    async fn get_finance_summary(&self, cookie: &str) -> SyncResult<String>;

    async fn get_exams(&self, body: &ExamRequestBody, cookie: &str)
        -> SyncResult<Vec<ExamRecord>>;

    async fn get_grades(&self, term: &str, cookie: &str) -> SyncResult<GradeRecord>;

    /// Raw profile body; see [`crate::protocol::parse_profile`].
    async fn get_profile(&self, cookie: &str) -> SyncResult<String>;

    async fn get_resources(
        &self,
        cookie: &str,
        courses: &[CourseRef],
    ) -> SyncResult<Vec<ResourceDto>>;
}

// =============================================================================
// Reqwest Client
// =============================================================================

/// HTTP implementation of [`PortalGateway`].
pub struct PortalClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PortalClient {
    /// Builds a client from validated configuration.
    ///
    /// Redirects are disabled: the portal answers sign-in with a redirect
    /// whose Set-Cookie header is the session, and following it would lose
    /// the header.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.portal.base_url)?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.transport.connect_timeout_secs))
            .timeout(Duration::from_secs(config.transport.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;

        Ok(PortalClient { http, base_url })
    }

    fn url(&self, path: &str) -> SyncResult<Url> {
        self.base_url.join(path).map_err(SyncError::from)
    }

    fn with_cookie(&self, request: reqwest::RequestBuilder, cookie: &str) -> reqwest::RequestBuilder {
        if cookie.is_empty() {
            request
        } else {
            request.header(header::COOKIE, cookie)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cookie: &str,
        endpoint: &str,
    ) -> SyncResult<T> {
        debug!(endpoint, "Fetching");

        let request = self.with_cookie(self.http.get(self.url(path)?), cookie);
        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_error(endpoint, e))?;

        response.json().await.map_err(|e| fetch_error(endpoint, e))
    }

    async fn get_text(&self, path: &str, cookie: &str, endpoint: &str) -> SyncResult<String> {
        debug!(endpoint, "Fetching");

        let request = self.with_cookie(self.http.get(self.url(path)?), cookie);
        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_error(endpoint, e))?;

        response.text().await.map_err(|e| fetch_error(endpoint, e))
    }
}

fn fetch_error(endpoint: &str, message: impl ToString) -> SyncError {
    SyncError::Fetch {
        endpoint: endpoint.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl PortalGateway for PortalClient {
    async fn get_tokens(&self) -> SyncResult<Tokens> {
        debug!("Fetching anti-forgery tokens");

        let response = self
            .http
            .get(self.url(endpoints::TOKENS)?)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| SyncError::TokenAcquisition(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| SyncError::TokenAcquisition(e.to_string()))
    }

    async fn sign_in(
        &self,
        username: &str,
        password: &str,
        tokens: &Tokens,
        cookie: &str,
    ) -> SyncResult<AuthResponse> {
        debug!("Signing in");

        let form = [
            ("username", username),
            ("password", password),
            (tokens.field_name.as_str(), tokens.field_value.as_str()),
        ];

        let request = self.with_cookie(self.http.post(self.url(endpoints::SIGN_IN)?), cookie);
        let response = request
            .form(&form)
            .send()
            .await
            .map_err(|e| SyncError::Authentication(e.to_string()))?;

        // Redirect responses are expected here (redirects are disabled so
        // the Set-Cookie header survives); only real errors fail.
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(SyncError::Authentication(format!(
                "sign-in returned {status}"
            )));
        }

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(AuthResponse { cookie })
    }

    async fn bootstrap(&self, cookie: &str) -> SyncResult<()> {
        self.get_text(endpoints::BOOTSTRAP, cookie, "bootstrap")
            .await
            .map(|_| ())
    }

    async fn get_terms(&self, cookie: &str) -> SyncResult<Vec<Term>> {
        let dtos: Vec<TermDto> = self.get_json(endpoints::TERMS, cookie, "terms").await?;
        Ok(into_terms(dtos))
    }

    async fn get_sessions(&self, cookie: &str) -> SyncResult<Vec<SessionRecord>> {
        let dtos: Vec<SessionDto> = self
            .get_json(endpoints::SESSIONS, cookie, "sessions")
            .await?;
        Ok(dtos.into_iter().map(SessionRecord::from).collect())
    }

    async fn get_finances(&self, cookie: &str) -> SyncResult<Vec<FinanceRecord>> {
        let dtos: Vec<FinanceDto> = self
            .get_json(endpoints::FINANCES, cookie, "finances")
            .await?;
        Ok(dtos.into_iter().map(FinanceRecord::from).collect())
    }

    async fn get_finance_summary(&self, cookie: &str) -> SyncResult<String> {
        self.get_text(endpoints::FINANCE_SUMMARY, cookie, "financeSummary")
            .await
    }

    async fn get_exams(
        &self,
        body: &ExamRequestBody,
        cookie: &str,
    ) -> SyncResult<Vec<ExamRecord>> {
        debug!(term = %body.term, "Fetching exam schedule");

        let request = self.with_cookie(self.http.post(self.url(endpoints::EXAMS)?), cookie);
        let response = request
            .json(body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_error("exams", e))?;

        let dtos: Vec<ExamDto> = response.json().await.map_err(|e| fetch_error("exams", e))?;
        Ok(dtos.into_iter().map(ExamRecord::from).collect())
    }

    async fn get_grades(&self, term: &str, cookie: &str) -> SyncResult<GradeRecord> {
        let path = format!("{}/{}", endpoints::GRADES, term);
        let dto: GradeDto = self.get_json(&path, cookie, "grades").await?;
        Ok(dto.into_record(term))
    }

    async fn get_profile(&self, cookie: &str) -> SyncResult<String> {
        self.get_text(endpoints::PROFILE, cookie, "profile").await
    }

    async fn get_resources(
        &self,
        cookie: &str,
        courses: &[CourseRef],
    ) -> SyncResult<Vec<ResourceDto>> {
        debug!(courses = courses.len(), "Fetching course resources");

        let request = self.with_cookie(self.http.post(self.url(endpoints::RESOURCES)?), cookie);
        let response = request
            .json(courses)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_error("resources", e))?;

        response
            .json()
            .await
            .map_err(|e| fetch_error("resources", e))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_default_config() {
        let client = PortalClient::new(&SyncConfig::default()).unwrap();
        let url = client.url(endpoints::TERMS).unwrap();
        assert_eq!(
            url.as_str(),
            "https://portal.campus.ac.id/services/general/terms"
        );
    }

    #[test]
    fn test_grades_path_includes_term() {
        let client = PortalClient::new(&SyncConfig::default()).unwrap();
        let path = format!("{}/{}", endpoints::GRADES, "1610");
        let url = client.url(&path).unwrap();
        assert!(url.as_str().ends_with("grade/term/1610"));
    }

    #[test]
    fn test_client_rejects_invalid_base_url() {
        let mut config = SyncConfig::default();
        config.portal.base_url = "not a url".to_string();
        assert!(matches!(
            PortalClient::new(&config),
            Err(SyncError::InvalidUrl(_))
        ));
    }
}
