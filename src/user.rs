use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::LazyLock;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{AppState, BloodType, UserId};

////////////////////////////////////////////// UserRole ///////////////////////////////////////////

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleParseError {
    invalid: String,
}

impl Display for UserRoleParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Unknown role {:?}. Expected one of donor, beneficiary, admin, medical_facility",
            self.invalid
        )
    }
}

impl std::error::Error for UserRoleParseError {}

/// The part a user plays on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Donor,
    Beneficiary,
    Admin,
    MedicalFacility,
}

impl UserRole {
    /// Returns the wire form of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Donor => "donor",
            UserRole::Beneficiary => "beneficiary",
            UserRole::Admin => "admin",
            UserRole::MedicalFacility => "medical_facility",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donor" => Ok(UserRole::Donor),
            "beneficiary" => Ok(UserRole::Beneficiary),
            "admin" => Ok(UserRole::Admin),
            "medical_facility" => Ok(UserRole::MedicalFacility),
            _ => Err(UserRoleParseError {
                invalid: s.to_string(),
            }),
        }
    }
}

//////////////////////////////////////////////// User /////////////////////////////////////////////

/// A registered user.
///
/// The bcrypt hash never appears here; it lives only in the SQL layer, so a
/// serialized `User` can always cross the API boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub blood_type: Option<BloodType>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub available_to_donate: bool,
    pub created_at: DateTime<Utc>,
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex compiles")
});

/// Checks that a string is a syntactically plausible email address.
pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

////////////////////////////////////////////// Routes //////////////////////////////////////////////

/// Query parameters for donor matching.
#[derive(Debug, Deserialize)]
pub struct DonorMatchQuery {
    /// Blood group to match exactly.
    pub blood_type: BloodType,
    /// Optional city to narrow by.
    pub city: Option<String>,
    /// Optional state to narrow by.
    pub state: Option<String>,
}

/// Finds available donors with the requested blood group.
///
/// Matching is a plain filter: role `donor`, exact blood-type equality,
/// `available_to_donate`, optionally narrowed by city and state.
async fn match_donors(
    State(state): State<AppState>,
    Query(query): Query<DonorMatchQuery>,
) -> Result<Json<Vec<User>>, (StatusCode, &'static str)> {
    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::user::match_donors(
        &mut tx,
        query.blood_type,
        query.city.as_deref(),
        query.state.as_deref(),
    )
    .await
    {
        Ok(donors) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(donors))
        }
        Err(_) => Err((StatusCode::INTERNAL_SERVER_ERROR, "failed to match donors")),
    }
}

/// Creates an Axum router with the donor-matching endpoint.
///
/// # Routes
/// - `GET /donors/match` - Find available donors by blood group and location
pub fn create_donor_router(state: AppState) -> Router {
    Router::new()
        .route("/donors/match", get(match_donors))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        for role in [
            UserRole::Donor,
            UserRole::Beneficiary,
            UserRole::Admin,
            UserRole::MedicalFacility,
        ] {
            let parsed: UserRole = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn unknown_role_rejected() {
        assert!("patient".parse::<UserRole>().is_err());
    }

    #[test]
    fn role_serde_is_snake_case() {
        let json = serde_json::to_string(&UserRole::MedicalFacility).unwrap();
        assert_eq!(json, "\"medical_facility\"");
    }

    #[test]
    fn valid_emails_accepted() {
        assert!(is_valid_email("donor@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
    }

    #[test]
    fn invalid_emails_rejected() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@host"));
        assert!(!is_valid_email("user@host."));
    }

    #[test]
    fn user_serialization_omits_nothing_sensitive() {
        let user = User {
            id: UserId::new([1u8; 16]),
            email: "donor@example.com".to_string(),
            full_name: "Test Donor".to_string(),
            role: UserRole::Donor,
            blood_type: Some(BloodType::OPositive),
            phone: None,
            location: None,
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            available_to_donate: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["blood_type"], "O+");
        assert_eq!(json["role"], "donor");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
