//! HTTP client for the ServiceDue backend.
//!
//! [`ServiceDueClient`] wraps a [`reqwest::Client`] together with the
//! endpoint layout ([`ApiRoutes`]) and, once signed in, the [`Session`]
//! whose token authenticates every customer and campaign call.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use servicedue_models::{
    ApiErrorBody, AuthResponse, CampaignLaunchRequest, LaunchReceipt, LeadPage, PageRequest,
    ResetPasswordRequest, Segment, SignInRequest, SignUpRequest,
};
use tracing::{debug, info, warn};

use crate::config::SdkConfig;
use crate::error::SdkError;
use crate::routes::ApiRoutes;
use crate::session::Session;

/// Client for the ServiceDue REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ServiceDueClient {
    http: reqwest::Client,
    routes: ApiRoutes,
    session: Option<Session>,
}

impl ServiceDueClient {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Build an anonymous client from the configuration.
    pub fn new(config: &SdkConfig) -> Result<Self, SdkError> {
        let api_url = config.api_url.trim();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "API URL must start with http:// or https://, got `{api_url}`"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        let routes = ApiRoutes::new(api_url);
        debug!(api = routes.base(), "client ready");
        Ok(Self {
            http,
            routes,
            session: None,
        })
    }

    /// Attach the session whose token authenticates subsequent calls.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }


    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// `POST /api/auth/signin`.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<AuthResponse, SdkError> {
        info!(email = %request.email, "signing in");
        let res = self.http.post(self.routes.sign_in()).json(request).send().await?;
        decode(res).await
    }

    /// `POST /api/auth/signup`.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthResponse, SdkError> {
        info!(email = %request.email, dealership = %request.dealership_name, "signing up");
        let res = self.http.post(self.routes.sign_up()).json(request).send().await?;
        decode(res).await
    }

    /// `POST /api/auth/reset-password`. The response body is ignored.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), SdkError> {
        info!(email = %request.email, "requesting password reset");
        let res = self
            .http
            .post(self.routes.reset_password())
            .json(request)
            .send()
            .await?;
        check(res).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Customers & campaigns
    // ------------------------------------------------------------------

    /// `GET /api/customers/{slug}`: one page of a segment's leads.
    pub async fn customers(
        &self,
        segment: Segment,
        page: PageRequest,
    ) -> Result<LeadPage, SdkError> {
        debug!(%segment, page = page.page, limit = page.limit, "fetching customers");
        let req = self.authorized(self.http.get(self.routes.customers(segment, page)))?;
        let leads: LeadPage = decode(req.send().await?).await?;
        info!(
            %segment,
            showing = leads.customers.len(),
            total = leads.total,
            "fetched customers"
        );
        Ok(leads)
    }

    /// `POST /api/campaigns/launch`.
    ///
    /// Sent once per confirmed launch; never retried. An empty or
    /// non-JSON success body yields a default receipt.
    pub async fn launch_campaign(
        &self,
        request: &CampaignLaunchRequest,
    ) -> Result<LaunchReceipt, SdkError> {
        info!(
            segment = %request.segment,
            channel = %request.channel,
            template = %request.template_id,
            recipients = request.lead_ids.len(),
            "launching campaign"
        );
        let req = self.authorized(self.http.post(self.routes.launch_campaign()).json(request))?;
        let res = check(req.send().await?).await?;
        let body = res.text().await?;
        let receipt = serde_json::from_str(&body).unwrap_or_else(|e| {
            if !body.trim().is_empty() {
                debug!(error = %e, "launch response is not a receipt");
            }
            LaunchReceipt::default()
        });
        Ok(receipt)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, SdkError> {
        let session = self.session.as_ref().ok_or(SdkError::NotSignedIn)?;
        if session.is_expired() {
            return Err(SdkError::SessionExpired);
        }
        Ok(builder.bearer_auth(&session.auth_token))
    }
}

/// Turn a non-2xx response into an [`SdkError`].
async fn check(res: Response) -> Result<Response, SdkError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .map(|body| body.message())
        .filter(|d| !d.trim().is_empty());
    warn!(status = status.as_u16(), detail = detail.as_deref().unwrap_or(""), "request failed");
    if status == StatusCode::UNAUTHORIZED {
        return Err(SdkError::Unauthorized(detail.unwrap_or_default()));
    }
    Err(SdkError::Api { status, detail })
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, SdkError> {
    let res = check(res).await?;
    let bytes = res.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base() {
        let cfg = SdkConfig {
            api_url: "localhost:8000".into(),
            ..SdkConfig::default()
        };
        assert!(matches!(
            ServiceDueClient::new(&cfg),
            Err(SdkError::Config(_))
        ));
    }

    #[tokio::test]
    async fn authenticated_call_requires_session() {
        let client = ServiceDueClient::new(&SdkConfig::default()).unwrap();
        assert!(client.session().is_none());
        let err = client
            .customers(Segment::Warranty, PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::NotSignedIn));
    }
}
