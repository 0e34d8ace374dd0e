use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::ContentItem,
};

pub const VOTE_ACTION: &str = "like_or_bad_vote";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Subscriber,
    Author,
    Editor,
    Administrator,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    /// Issues an admin bearer token. The host site's login normally does
    /// this; the service itself only verifies.
    pub fn new(
        user_id: Uuid,
        username: String,
        role: Role,
        secret: &str,
    ) -> Result<(String, Self)> {
        let now = Utc::now();
        let exp = now + Duration::hours(24);

        let claims = Self {
            sub: user_id.to_string(),
            username,
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )?;

        Ok((token, claims))
    }

    pub fn verify(token: &str, secret: &str) -> Result<Self> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Authentication("Invalid token".to_string()))?;

        Ok(token_data.claims)
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    /// Edit rights on one item: editors and above, or the item's author.
    pub fn can_edit(&self, item: &ContentItem) -> bool {
        self.role >= Role::Editor || (self.role >= Role::Author && item.author_id == self.user_id)
    }

    pub fn can_list(&self) -> bool {
        self.role >= Role::Author
    }

    pub fn can_manage_settings(&self) -> bool {
        self.role == Role::Administrator
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Authentication("Missing authorization header".to_string()))?;

        let claims = Claims::verify(bearer.token(), &state.config.app_secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Authentication("Invalid user ID in token".to_string()))?;

        Ok(AuthUser {
            user_id,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// Anti-forgery token embedded in the rendered widget. Scoped to one action
/// and valid for a fixed window; it is not bound to a visitor identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionClaims {
    pub action: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Clone)]
pub struct ActionTokens {
    secret: String,
    ttl: Duration,
}

impl ActionTokens {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            secret: secret.to_string(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, action: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = ActionClaims {
            action: action.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        sign(&claims, &self.secret)
    }

    pub fn verify(&self, token: &str, action: &str, now: DateTime<Utc>) -> bool {
        match verify_signature::<ActionClaims>(token, &self.secret) {
            Some(claims) => claims.action == action && claims.exp > now.timestamp(),
            None => false,
        }
    }
}

/// Signs claims with HS256 under the service secret.
pub fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// Checks the signature only. Expiry is left to the caller, which compares
/// against its own notion of "now".
pub fn verify_signature<T: DeserializeOwned>(token: &str, secret: &str) -> Option<T> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    decode::<T>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
        .map(|data| data.claims)
        .ok()
}
