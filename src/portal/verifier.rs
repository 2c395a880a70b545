//! The portal's view of the verifying party: challenge fetch, finalize and sign-out.

use anyhow::{Context, Result};
use async_trait::async_trait;
use http::StatusCode;
use log::debug;
use reqwest::{Client, Response};
use url::Url;

use crate::consts::{IDENTITY_FINISH_ENDPOINT, IDENTITY_START_ENDPOINT, LOGOUT_ENDPOINT, REGISTER_ENDPOINT};
use crate::models::{
    AuthenticatorResponse, IdentityFinishBody, IdentityStartBody, RegistrationChallengeSet, SignOutBody,
    SignOutResult,
};
use crate::portal::error::{FlowError, FlowResult};
use crate::portal::identity_token::IdentityToken;

#[async_trait]
pub trait VerifyingParty: Send + Sync {
    /// Step 1: exchanges the identity token for a challenge set.
    async fn fetch_challenge(&self, token: &IdentityToken) -> FlowResult<RegistrationChallengeSet>;

    /// Step 2: submits the authenticator response.
    async fn finalize(&self, response: &AuthenticatorResponse) -> FlowResult<()>;

    /// Destroys the session and asks whether `redirection_url` is a trusted target.
    async fn sign_out(&self, redirection_url: Option<&str>) -> FlowResult<SignOutResult>;
}

/// JSON over HTTP, keeping the session cookie between calls like a browser would.
pub struct HttpVerifyingParty {
    client: Client,
    identity_start: Url,
    identity_finish: Url,
    register: Url,
    logout: Url,
}

impl HttpVerifyingParty {
    pub fn new(base_url: &Url) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        let endpoint = |path: &str| {
            base_url
                .join(path)
                .with_context(|| format!("Invalid verifying party URL {}", base_url))
        };

        Ok(HttpVerifyingParty {
            client,
            identity_start: endpoint(IDENTITY_START_ENDPOINT)?,
            identity_finish: endpoint(IDENTITY_FINISH_ENDPOINT)?,
            register: endpoint(REGISTER_ENDPOINT)?,
            logout: endpoint(LOGOUT_ENDPOINT)?,
        })
    }

    /// Asks the verifying party to mail a registration link to the user and
    /// binds this client's session to that user.
    pub async fn start_identity_verification(&self, username: &str, email: &str) -> FlowResult<()> {
        let body = IdentityStartBody {
            username: username.to_string(),
            email: email.to_string(),
        };
        let response = self.client.post(self.identity_start.clone()).json(&body).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(FlowError::Rejected(status)),
        }
    }

    async fn post<T: serde::Serialize>(&self, url: &Url, body: &T) -> FlowResult<Response> {
        let response = self.client.post(url.clone()).json(body).send().await?;
        debug!("POST {} -> {}", url.path(), response.status());
        Ok(response)
    }
}

#[async_trait]
impl VerifyingParty for HttpVerifyingParty {
    async fn fetch_challenge(&self, token: &IdentityToken) -> FlowResult<RegistrationChallengeSet> {
        let body = IdentityFinishBody {
            token: token.as_str().to_string(),
        };
        let response = self.post(&self.identity_finish, &body).await?;

        match response.status() {
            status if status.is_success() => {
                let set: RegistrationChallengeSet = response.json().await?;
                if set.register_requests.is_empty() {
                    return Err(FlowError::EmptyChallengeSet);
                }
                Ok(set)
            }
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => Err(FlowError::Unauthorized(status)),
            status => Err(FlowError::Rejected(status)),
        }
    }

    async fn finalize(&self, response: &AuthenticatorResponse) -> FlowResult<()> {
        let answer = self.post(&self.register, response).await?;

        match answer.status() {
            status if status.is_success() => Ok(()),
            StatusCode::FORBIDDEN => Err(FlowError::OriginMismatch),
            StatusCode::UNAUTHORIZED => Err(FlowError::Unauthorized(StatusCode::UNAUTHORIZED)),
            status => Err(FlowError::Rejected(status)),
        }
    }

    async fn sign_out(&self, redirection_url: Option<&str>) -> FlowResult<SignOutResult> {
        let body = SignOutBody {
            target_url: redirection_url.map(str::to_string),
        };
        let response = self.post(&self.logout, &body).await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            status => Err(FlowError::Rejected(status)),
        }
    }
}
