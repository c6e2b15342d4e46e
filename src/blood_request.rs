use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::{AppState, BloodType, RequestId, UserId};

////////////////////////////////////////////// Urgency ////////////////////////////////////////////

/// How urgently a request needs to be fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

impl Display for Urgency {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown urgency string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrgencyParseError {
    invalid: String,
}

impl Display for UrgencyParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Unknown urgency {:?}. Expected one of low, medium, high, critical",
            self.invalid
        )
    }
}

impl std::error::Error for UrgencyParseError {}

impl FromStr for Urgency {
    type Err = UrgencyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            "critical" => Ok(Urgency::Critical),
            _ => Err(UrgencyParseError {
                invalid: s.to_string(),
            }),
        }
    }
}

/////////////////////////////////////////// RequestStatus //////////////////////////////////////////

/// Lifecycle state of a blood request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Active,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Active => "active",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestStatusParseError {
    invalid: String,
}

impl Display for RequestStatusParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Unknown status {:?}. Expected one of active, fulfilled, cancelled",
            self.invalid
        )
    }
}

impl std::error::Error for RequestStatusParseError {}

impl FromStr for RequestStatus {
    type Err = RequestStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RequestStatus::Active),
            "fulfilled" => Ok(RequestStatus::Fulfilled),
            "cancelled" => Ok(RequestStatus::Cancelled),
            _ => Err(RequestStatusParseError {
                invalid: s.to_string(),
            }),
        }
    }
}

///////////////////////////////////////////// BloodRequest ////////////////////////////////////////

/// A posted request for blood, browsable by donors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: RequestId,
    pub patient_name: String,
    pub blood_type: BloodType,
    pub units_needed: i32,
    pub urgency: Urgency,
    pub hospital_name: String,
    pub city: String,
    pub state: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub reason: Option<String>,
    pub status: RequestStatus,
    pub requested_by: UserId,
    pub requested_by_name: String,
    pub created_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
}

////////////////////////////////////////////// Routes //////////////////////////////////////////////

/// Request structure for posting a blood request.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBloodRequestRequest {
    pub patient_name: String,
    pub blood_type: BloodType,
    pub units_needed: i32,
    pub urgency: Urgency,
    pub hospital_name: String,
    pub city: String,
    pub state: String,
    pub contact_phone: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl CreateBloodRequestRequest {
    /// Validates field contents beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.patient_name.trim().is_empty() {
            return Err("patient_name must not be empty");
        }
        if self.hospital_name.trim().is_empty() {
            return Err("hospital_name must not be empty");
        }
        if self.units_needed < 1 {
            return Err("units_needed must be at least 1");
        }
        Ok(())
    }
}

/// Query filters for browsing blood requests.
#[derive(Debug, Deserialize)]
pub struct BloodRequestQuery {
    pub blood_type: Option<BloodType>,
    pub city: Option<String>,
    pub urgency: Option<Urgency>,
    #[serde(default = "default_status")]
    pub status: RequestStatus,
}

fn default_status() -> RequestStatus {
    RequestStatus::Active
}

/// Query parameter for updating a request's status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusQuery {
    pub status: RequestStatus,
}

/// Acknowledgement returned by the status update endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub message: String,
}

/// Posts a new blood request, stamped with the authenticated requester.
async fn create_blood_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateBloodRequestRequest>,
) -> Result<Json<BloodRequest>, (StatusCode, &'static str)> {
    if let Err(msg) = request.validate() {
        return Err((StatusCode::BAD_REQUEST, msg));
    }

    let id = RequestId::random().map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to generate request id",
        )
    })?;

    let blood_request = BloodRequest {
        id,
        patient_name: request.patient_name,
        blood_type: request.blood_type,
        units_needed: request.units_needed,
        urgency: request.urgency,
        hospital_name: request.hospital_name,
        city: request.city,
        state: request.state,
        contact_phone: request.contact_phone,
        contact_email: request.contact_email,
        reason: request.reason,
        status: RequestStatus::Active,
        requested_by: user.id,
        requested_by_name: user.full_name,
        created_at: Utc::now(),
        fulfilled_at: None,
    };

    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::blood_request::create(&mut tx, &blood_request).await {
        Ok(()) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(blood_request))
        }
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to create blood request",
        )),
    }
}

/// Browses blood requests, newest first.
async fn list_blood_requests(
    State(state): State<AppState>,
    Query(query): Query<BloodRequestQuery>,
) -> Result<Json<Vec<BloodRequest>>, (StatusCode, &'static str)> {
    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::blood_request::list(
        &mut tx,
        query.status,
        query.blood_type,
        query.city.as_deref(),
        query.urgency,
    )
    .await
    {
        Ok(requests) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(requests))
        }
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to list blood requests",
        )),
    }
}

/// Gets a single blood request by id.
async fn get_blood_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BloodRequest>, (StatusCode, &'static str)> {
    let request_id: RequestId = id
        .parse()
        .map_err(|_e| (StatusCode::BAD_REQUEST, "invalid request id"))?;

    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::blood_request::get(&mut tx, &request_id).await {
        Ok(Some(request)) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(request))
        }
        Ok(None) => Err((StatusCode::NOT_FOUND, "blood request not found")),
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to retrieve blood request",
        )),
    }
}

/// Updates a request's status.
///
/// Moving to `fulfilled` stamps `fulfilled_at`; any other status clears it.
async fn update_request_status(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    Query(query): Query<UpdateStatusQuery>,
) -> Result<Json<UpdateStatusResponse>, (StatusCode, &'static str)> {
    let request_id: RequestId = id
        .parse()
        .map_err(|_e| (StatusCode::BAD_REQUEST, "invalid request id"))?;

    let fulfilled_at = if query.status == RequestStatus::Fulfilled {
        Some(Utc::now())
    } else {
        None
    };

    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::blood_request::update_status(&mut tx, &request_id, query.status, fulfilled_at)
        .await
    {
        Ok(true) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(UpdateStatusResponse {
                message: "status updated".to_string(),
            }))
        }
        Ok(false) => Err((StatusCode::NOT_FOUND, "blood request not found")),
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to update status",
        )),
    }
}

/// Creates an Axum router with the blood request endpoints.
///
/// # Routes
/// - `POST /blood-requests` - Post a request (bearer-protected)
/// - `GET /blood-requests` - Browse requests with filters
/// - `GET /blood-requests/{id}` - Get a single request
/// - `PATCH /blood-requests/{id}/status` - Update a request's status (bearer-protected)
pub fn create_blood_request_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/blood-requests",
            get(list_blood_requests).post(create_blood_request),
        )
        .route("/blood-requests/:id", get(get_blood_request))
        .route("/blood-requests/:id/status", patch(update_request_status))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateBloodRequestRequest {
        CreateBloodRequestRequest {
            patient_name: "Jordan Smith".to_string(),
            blood_type: BloodType::APositive,
            units_needed: 2,
            urgency: Urgency::High,
            hospital_name: "General Hospital".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            contact_phone: "555-0100".to_string(),
            contact_email: None,
            reason: None,
        }
    }

    #[test]
    fn urgency_round_trip() {
        for urgency in [
            Urgency::Low,
            Urgency::Medium,
            Urgency::High,
            Urgency::Critical,
        ] {
            let parsed: Urgency = urgency.as_str().parse().unwrap();
            assert_eq!(parsed, urgency);
        }
    }

    #[test]
    fn status_round_trip() {
        for status in [
            RequestStatus::Active,
            RequestStatus::Fulfilled,
            RequestStatus::Cancelled,
        ] {
            let parsed: RequestStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_urgency_and_status_rejected() {
        assert!("urgent".parse::<Urgency>().is_err());
        assert!("open".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn validate_accepts_reasonable_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_patient_name() {
        let mut request = valid_request();
        request.patient_name = "  ".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_units() {
        let mut request = valid_request();
        request.units_needed = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn model_serde_round_trip() {
        let request = BloodRequest {
            id: RequestId::new([5u8; 16]),
            patient_name: "Jordan Smith".to_string(),
            blood_type: BloodType::AbPositive,
            units_needed: 3,
            urgency: Urgency::Critical,
            hospital_name: "General Hospital".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            contact_phone: "555-0100".to_string(),
            contact_email: Some("contact@example.com".to_string()),
            reason: Some("surgery".to_string()),
            status: RequestStatus::Active,
            requested_by: UserId::new([1u8; 16]),
            requested_by_name: "Alex Doe".to_string(),
            created_at: Utc::now(),
            fulfilled_at: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        let back: BloodRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request, back);
    }
}
