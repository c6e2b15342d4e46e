//! Password hashing, token issuance, and bearer authentication.
//!
//! Passwords are hashed with bcrypt before they reach the database. Sessions
//! are stateless HS256 tokens carrying the user id and email; the [`AuthUser`]
//! extractor verifies the bearer token and loads the caller's user row in
//! front of every protected handler.

use std::fmt::{Display, Formatter, Result as FmtResult};

use axum::Router;
use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::Json;
use axum::routing::{get, post};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::user::is_valid_email;
use crate::{AppState, BloodType, StoreError, User, UserId, UserRole};

///////////////////////////////////////////// Passwords ///////////////////////////////////////////

/// Hashes a password with bcrypt at the library default cost.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Verifies a password against a stored bcrypt hash.
///
/// A malformed hash verifies as false rather than surfacing an error; the
/// caller cannot distinguish it from a wrong password, which is the point.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

////////////////////////////////////////////// Tokens /////////////////////////////////////////////

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The user id, in its string form.
    pub sub: String,
    /// The user's email at issuance time.
    pub email: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Error returned when a token fails verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token's signature is valid but it has expired.
    Expired,
    /// The token is malformed or signed with a different secret.
    Invalid,
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::Invalid => write!(f, "Could not validate credentials"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Token-issuance configuration: the HS256 secret and token lifetime.
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    token_lifetime: Duration,
}

impl AuthConfig {
    /// Creates a configuration with the default seven-day token lifetime.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_lifetime: Duration::days(7),
        }
    }

    /// Overrides the token lifetime.
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Issues a signed access token for a user.
    pub fn issue_token(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp: (Utc::now() + self.token_lifetime).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Verifies a token's signature and expiry, returning its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
    }
}

///////////////////////////////////////// Bearer extraction ///////////////////////////////////////

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Verifies the bearer token and loads the user row it names. Handlers that
/// take an `AuthUser` argument reject unauthenticated requests with 401
/// before their body runs.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or((StatusCode::UNAUTHORIZED, "expected a bearer token"))?;

        let claims = state.auth.verify_token(token).map_err(|e| match e {
            TokenError::Expired => (StatusCode::UNAUTHORIZED, "token has expired"),
            TokenError::Invalid => (StatusCode::UNAUTHORIZED, "could not validate credentials"),
        })?;

        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| (StatusCode::UNAUTHORIZED, "could not validate credentials"))?;

        let mut tx = state.pool.begin().await.map_err(|_e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to begin transaction",
            )
        })?;

        let user = match crate::sql::user::get(&mut tx, &user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err((StatusCode::UNAUTHORIZED, "user not found")),
            Err(_) => {
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to load user",
                ));
            }
        };
        tx.commit().await.map_err(|_e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to commit transaction",
            )
        })?;

        Ok(AuthUser(user))
    }
}

////////////////////////////////////////////// Routes //////////////////////////////////////////////

/// Request structure for registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(default)]
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Request structure for login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response structure for register and login: a bearer token plus the user.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

/// Registers a new user and returns a token for the fresh account.
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, &'static str)> {
    if !is_valid_email(&request.email) {
        return Err((StatusCode::BAD_REQUEST, "invalid email address"));
    }
    if request.password.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "password must not be empty"));
    }

    let password_hash = hash_password(&request.password).map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to hash password",
        )
    })?;

    let id = UserId::random().map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to generate user id",
        )
    })?;

    let user = User {
        id,
        email: request.email,
        full_name: request.full_name,
        role: request.role,
        blood_type: request.blood_type,
        phone: request.phone,
        location: request.location,
        city: request.city,
        state: request.state,
        available_to_donate: true,
        created_at: Utc::now(),
    };

    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::user::create(&mut tx, &user, &password_hash).await {
        Ok(()) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            let access_token = state.auth.issue_token(&user).map_err(|_e| {
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to issue token")
            })?;
            Ok(Json(TokenResponse {
                access_token,
                token_type: "bearer".to_string(),
                user,
            }))
        }
        Err(StoreError::AlreadyExists) => {
            Err((StatusCode::BAD_REQUEST, "email already registered"))
        }
        Err(_) => Err((StatusCode::INTERNAL_SERVER_ERROR, "failed to register user")),
    }
}

/// Verifies credentials and returns a fresh token.
///
/// Unknown email and wrong password are indistinguishable to the caller.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, &'static str)> {
    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    let row = match crate::sql::user::get_by_email(&mut tx, &request.email).await {
        Ok(row) => row,
        Err(_) => {
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "failed to look up user"));
        }
    };
    tx.commit().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to commit transaction",
        )
    })?;

    let row = row.ok_or((StatusCode::UNAUTHORIZED, "invalid email or password"))?;

    if !verify_password(&request.password, &row.password_hash) {
        return Err((StatusCode::UNAUTHORIZED, "invalid email or password"));
    }

    let access_token = state
        .auth
        .issue_token(&row.user)
        .map_err(|_e| (StatusCode::INTERNAL_SERVER_ERROR, "failed to issue token"))?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: row.user,
    }))
}

/// Returns the authenticated caller.
async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

/// Creates an Axum router with the authentication endpoints.
///
/// # Routes
/// - `POST /auth/register` - Register a new user and receive a token
/// - `POST /auth/login` - Exchange credentials for a token
/// - `GET /auth/me` - Return the authenticated user
pub fn create_auth_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: UserId::new([3u8; 16]),
            email: "donor@example.com".to_string(),
            full_name: "Test Donor".to_string(),
            role: UserRole::Donor,
            blood_type: Some(BloodType::ONegative),
            phone: None,
            location: None,
            city: None,
            state: None,
            available_to_donate: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_and_verify() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert_ne!(hash, "correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn malformed_hash_verifies_false() {
        assert!(!verify_password("anything", "not a bcrypt hash"));
    }

    #[test]
    fn token_round_trip() {
        let auth = AuthConfig::new("test-secret");
        let user = test_user();

        let token = auth.issue_token(&user).unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn expired_token_rejected() {
        let auth = AuthConfig::new("test-secret").with_token_lifetime(Duration::hours(-1));
        let token = auth.issue_token(&test_user()).unwrap();

        assert_eq!(auth.verify_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let issuer = AuthConfig::new("secret-one");
        let verifier = AuthConfig::new("secret-two");
        let token = issuer.issue_token(&test_user()).unwrap();

        assert_eq!(verifier.verify_token(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_token_rejected() {
        let auth = AuthConfig::new("test-secret");
        assert_eq!(
            auth.verify_token("not.a.token"),
            Err(TokenError::Invalid)
        );
    }
}
