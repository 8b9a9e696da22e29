//! HTTP client for the hosted identity provider.
//!
//! All verification happens on the provider's side: this client presents
//! tokens and codes and interprets the responses. It never decodes or
//! validates token formats locally.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use studysync_core::PrincipalId;

use crate::config::IdentityConfig;
use crate::error::IdentityError;
use crate::principal::{Principal, PrincipalMetadata, SessionTokens};

/// A session the provider has just verified for an incoming request.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    /// The authenticated principal.
    pub principal: Principal,
    /// Replacement tokens minted during resolution, if the provider rotated
    /// the session. The caller must write these onto the outgoing response
    /// cookies; dropping them silently logs the user out on the next
    /// request.
    pub rotated: Option<SessionTokens>,
}

/// A session established by a sign-in or code exchange.
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub principal: Principal,
    pub tokens: SessionTokens,
}

/// Outcome of a sign-up request.
///
/// Providers configured to require email confirmation return the principal
/// without a session; the user signs in after confirming.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub principal: Principal,
    pub tokens: Option<SessionTokens>,
}

/// Client for the identity provider's auth API.
pub struct IdentityClient {
    http: reqwest::Client,
    config: IdentityConfig,
}

/// Provider user payload embedded in token and user responses.
#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: PrincipalMetadata,
}

impl UserPayload {
    fn into_principal(self) -> Principal {
        Principal {
            id: PrincipalId::new(self.id),
            email: self.email.unwrap_or_default(),
            metadata: self.user_metadata,
        }
    }
}

/// Provider response for every token grant.
#[derive(Debug, Deserialize)]
struct TokenGrantResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: UserPayload,
}

impl TokenGrantResponse {
    fn into_session(self) -> EstablishedSession {
        EstablishedSession {
            principal: self.user.into_principal(),
            tokens: SessionTokens {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
                expires_in: self.expires_in,
            },
        }
    }
}

/// Provider sign-up response: a bare user when confirmation is pending,
/// or a full token grant when sessions are issued immediately.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenGrantResponse),
    PendingConfirmation(UserPayload),
}

/// Error body shape used by the provider.
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(alias = "error_description", alias = "message")]
    msg: Option<String>,
}

#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshGrantRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
struct CodeGrantRequest<'a> {
    auth_code: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a PrincipalMetadata,
}

impl IdentityClient {
    /// Creates a client for the configured provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| IdentityError::Configuration {
                details: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    /// Returns the configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Resolves the session carried in request cookies.
    ///
    /// Verification is delegated to the provider. A rejected access token
    /// triggers exactly one refresh attempt when a refresh token is
    /// present; a successful refresh yields rotated tokens the caller must
    /// propagate onto the response.
    ///
    /// # Errors
    ///
    /// Returns `ProviderUnavailable` when the provider cannot be reached.
    /// Rejected or expired tokens are `Ok(None)`, not errors.
    pub async fn resolve(
        &self,
        tokens: &SessionTokens,
    ) -> Result<Option<ResolvedSession>, IdentityError> {
        let response = self
            .http
            .get(format!("{}/user", self.config.auth_base()))
            .bearer_auth(&tokens.access_token)
            .header("apikey", self.config.publishable_key())
            .send()
            .await
            .map_err(connectivity_error)?;

        if response.status().is_success() {
            let user: UserPayload = response.json().await.map_err(decode_error)?;
            return Ok(Some(ResolvedSession {
                principal: user.into_principal(),
                rotated: None,
            }));
        }

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            let Some(refresh_token) = tokens.refresh_token.as_deref() else {
                return Ok(None);
            };
            return self.refresh(refresh_token).await;
        }

        Err(IdentityError::ProviderUnavailable {
            details: format!("session check returned {}", response.status()),
        })
    }

    /// Attempts to rotate an expired session with the refresh token.
    async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<Option<ResolvedSession>, IdentityError> {
        let response = self
            .http
            .post(format!(
                "{}/token?grant_type=refresh_token",
                self.config.auth_base()
            ))
            .header("apikey", self.config.publishable_key())
            .json(&RefreshGrantRequest { refresh_token })
            .send()
            .await
            .map_err(connectivity_error)?;

        if !response.status().is_success() {
            // A spent or revoked refresh token means no session, not a fault.
            tracing::debug!(status = %response.status(), "session refresh rejected");
            return Ok(None);
        }

        let grant: TokenGrantResponse = response.json().await.map_err(decode_error)?;
        let session = grant.into_session();
        Ok(Some(ResolvedSession {
            principal: session.principal,
            rotated: Some(session.tokens),
        }))
    }

    /// Exchanges an OAuth authorization code for a session.
    ///
    /// # Errors
    ///
    /// `CodeRejected` when the provider declines the code,
    /// `ProviderUnavailable` on connectivity failure.
    pub async fn exchange_code(&self, code: &str) -> Result<EstablishedSession, IdentityError> {
        let response = self
            .http
            .post(format!("{}/token?grant_type=pkce", self.config.auth_base()))
            .header("apikey", self.config.publishable_key())
            .json(&CodeGrantRequest { auth_code: code })
            .send()
            .await
            .map_err(connectivity_error)?;

        let status = response.status();
        if status.is_client_error() {
            let reason = read_provider_error(response).await;
            return Err(IdentityError::CodeRejected {
                status: status.as_u16(),
                reason,
            });
        }
        if !status.is_success() {
            return Err(IdentityError::ProviderUnavailable {
                details: format!("code exchange returned {status}"),
            });
        }

        let grant: TokenGrantResponse = response.json().await.map_err(decode_error)?;
        Ok(grant.into_session())
    }

    /// Registers a new principal with the provider.
    ///
    /// The display name and role hints are stored as principal metadata so
    /// the bootstrapper can read them back on any later login.
    ///
    /// # Errors
    ///
    /// `SignUpRejected` when the provider declines (duplicate email, weak
    /// password), `ProviderUnavailable` on connectivity failure.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &PrincipalMetadata,
    ) -> Result<SignUpOutcome, IdentityError> {
        let response = self
            .http
            .post(format!("{}/signup", self.config.auth_base()))
            .header("apikey", self.config.publishable_key())
            .json(&SignUpRequest {
                email,
                password,
                data: metadata,
            })
            .send()
            .await
            .map_err(connectivity_error)?;

        let status = response.status();
        if status.is_client_error() {
            let reason = read_provider_error(response).await;
            return Err(IdentityError::SignUpRejected { reason });
        }
        if !status.is_success() {
            return Err(IdentityError::ProviderUnavailable {
                details: format!("sign-up returned {status}"),
            });
        }

        match response.json().await.map_err(decode_error)? {
            SignUpResponse::Session(grant) => {
                let session = grant.into_session();
                Ok(SignUpOutcome {
                    principal: session.principal,
                    tokens: Some(session.tokens),
                })
            }
            SignUpResponse::PendingConfirmation(user) => Ok(SignUpOutcome {
                principal: user.into_principal(),
                tokens: None,
            }),
        }
    }

    /// Signs in an existing principal with email and password.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` when the provider rejects the pair,
    /// `ProviderUnavailable` on connectivity failure.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<EstablishedSession, IdentityError> {
        let response = self
            .http
            .post(format!(
                "{}/token?grant_type=password",
                self.config.auth_base()
            ))
            .header("apikey", self.config.publishable_key())
            .json(&PasswordGrantRequest { email, password })
            .send()
            .await
            .map_err(connectivity_error)?;

        let status = response.status();
        if status.is_client_error() {
            return Err(IdentityError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(IdentityError::ProviderUnavailable {
                details: format!("sign-in returned {status}"),
            });
        }

        let grant: TokenGrantResponse = response.json().await.map_err(decode_error)?;
        Ok(grant.into_session())
    }

    /// Revokes the provider-side session for an access token.
    ///
    /// # Errors
    ///
    /// `ProviderUnavailable` on connectivity failure; a provider rejection
    /// of an already-dead token is treated as success.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .http
            .post(format!("{}/logout", self.config.auth_base()))
            .bearer_auth(access_token)
            .header("apikey", self.config.publishable_key())
            .send()
            .await
            .map_err(connectivity_error)?;

        if response.status().is_server_error() {
            return Err(IdentityError::ProviderUnavailable {
                details: format!("sign-out returned {}", response.status()),
            });
        }

        Ok(())
    }
}

/// The provider operations the server depends on.
///
/// `IdentityClient` is the production implementation; the trait is the
/// seam that lets handlers run against a scripted provider in tests.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// See [`IdentityClient::resolve`].
    async fn resolve(
        &self,
        tokens: &SessionTokens,
    ) -> Result<Option<ResolvedSession>, IdentityError>;

    /// See [`IdentityClient::exchange_code`].
    async fn exchange_code(&self, code: &str) -> Result<EstablishedSession, IdentityError>;

    /// See [`IdentityClient::sign_up`].
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &PrincipalMetadata,
    ) -> Result<SignUpOutcome, IdentityError>;

    /// See [`IdentityClient::sign_in`].
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<EstablishedSession, IdentityError>;

    /// See [`IdentityClient::sign_out`].
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn resolve(
        &self,
        tokens: &SessionTokens,
    ) -> Result<Option<ResolvedSession>, IdentityError> {
        IdentityClient::resolve(self, tokens).await
    }

    async fn exchange_code(&self, code: &str) -> Result<EstablishedSession, IdentityError> {
        IdentityClient::exchange_code(self, code).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &PrincipalMetadata,
    ) -> Result<SignUpOutcome, IdentityError> {
        IdentityClient::sign_up(self, email, password, metadata).await
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<EstablishedSession, IdentityError> {
        IdentityClient::sign_in(self, email, password).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        IdentityClient::sign_out(self, access_token).await
    }
}

fn connectivity_error(err: reqwest::Error) -> IdentityError {
    IdentityError::ProviderUnavailable {
        details: err.to_string(),
    }
}

fn decode_error(err: reqwest::Error) -> IdentityError {
    IdentityError::MalformedResponse {
        details: err.to_string(),
    }
}

async fn read_provider_error(response: reqwest::Response) -> String {
    match response.json::<ProviderErrorBody>().await {
        Ok(body) => body.msg.unwrap_or_else(|| "no reason given".to_string()),
        Err(_) => "no reason given".to_string(),
    }
}
