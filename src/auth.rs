// src/auth.rs
use crate::app_log;
use anyhow::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const PUBLIC_KEYS_URL: &str =
    "https://www.googleapis.com/robot/v1/metadata/x509/securetoken@system.gserviceaccount.com";

/// Identity of the user behind a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Caller {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            name: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub aud: String, // identity provider project id
    pub iss: String,
    pub sub: String, // user id
    pub email: Option<String>,
    pub name: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

pub struct AuthConfig {
    pub project_id: String,
    pub public_keys: HashMap<String, String>, // kid -> PEM
}

impl AuthConfig {
    pub fn new(project_id: String) -> Self {
        Self {
            project_id,
            public_keys: HashMap::new(),
        }
    }

    /// Fetch the identity provider's signing keys
    pub async fn update_public_keys(&mut self) -> Result<()> {
        let response = reqwest::get(PUBLIC_KEYS_URL).await?;
        let keys: HashMap<String, String> = response.json().await?;

        app_log!(info, "Updated identity provider public keys ({} keys)", keys.len());
        self.public_keys = keys;

        Ok(())
    }

    pub fn verify(&self, token: &str) -> Result<Caller> {
        let header = jsonwebtoken::decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| anyhow::anyhow!("Missing kid in token header"))?;

        let public_key = self
            .public_keys
            .get(&kid)
            .ok_or_else(|| anyhow::anyhow!("Unknown key ID: {}", kid))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!(
            "https://securetoken.google.com/{}",
            self.project_id
        )]);

        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())?;
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;

        Ok(token_data.claims.into())
    }
}

/// Token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidToken),
    }
}

/// Request guard: a verified caller, or 401
pub struct AuthenticatedUser {
    pub caller: Caller,
}

impl AuthenticatedUser {
    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    pub fn user_id(&self) -> &str {
        &self.caller.user_id
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::NotConfigured)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match bearer_token(header) {
                Ok(token) => token,
                Err(e) => {
                    app_log!(warn, "Invalid Authorization header format");
                    return Outcome::Error((Status::Unauthorized, e));
                }
            },
            None => {
                app_log!(debug, "Missing Authorization header");
                return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
            }
        };

        match auth_config.verify(token) {
            Ok(caller) => {
                app_log!(debug, "User {} authenticated", caller.user_id);
                Outcome::Success(AuthenticatedUser { caller })
            }
            Err(e) => {
                app_log!(warn, "Token verification failed: {}", e);
                Outcome::Error((Status::Unauthorized, AuthError::TokenVerificationFailed))
            }
        }
    }
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalAuth {
    pub user: Option<AuthenticatedUser>,
}

impl OptionalAuth {
    pub fn caller(&self) -> Option<&Caller> {
        self.user.as_ref().map(AuthenticatedUser::caller)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAuth {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedUser::from_request(req).await {
            Outcome::Success(auth) => Outcome::Success(OptionalAuth { user: Some(auth) }),
            _ => Outcome::Success(OptionalAuth { user: None }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    NotConfigured,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::NotConfigured => "Authentication is not configured",
        }
    }
}
