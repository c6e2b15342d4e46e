use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::{AppState, BloodType, FacilityId};

//////////////////////////////////////////// FacilityType /////////////////////////////////////////

/// The kind of medical facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    Hospital,
    Clinic,
    BloodBank,
    DiagnosticCenter,
}

impl FacilityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacilityType::Hospital => "hospital",
            FacilityType::Clinic => "clinic",
            FacilityType::BloodBank => "blood_bank",
            FacilityType::DiagnosticCenter => "diagnostic_center",
        }
    }
}

impl Display for FacilityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown facility type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityTypeParseError {
    invalid: String,
}

impl Display for FacilityTypeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Unknown facility type {:?}. Expected one of hospital, clinic, blood_bank, diagnostic_center",
            self.invalid
        )
    }
}

impl std::error::Error for FacilityTypeParseError {}

impl FromStr for FacilityType {
    type Err = FacilityTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hospital" => Ok(FacilityType::Hospital),
            "clinic" => Ok(FacilityType::Clinic),
            "blood_bank" => Ok(FacilityType::BloodBank),
            "diagnostic_center" => Ok(FacilityType::DiagnosticCenter),
            _ => Err(FacilityTypeParseError {
                invalid: s.to_string(),
            }),
        }
    }
}

/////////////////////////////////////////// MedicalFacility ///////////////////////////////////////

/// A hospital, clinic, blood bank, or diagnostic center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalFacility {
    pub id: FacilityId,
    pub name: String,
    pub facility_type: FacilityType,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub email: Option<String>,
    pub services: Vec<String>,
    pub blood_types_available: Vec<BloodType>,
    pub created_at: DateTime<Utc>,
}

////////////////////////////////////////////// Routes //////////////////////////////////////////////

/// Request structure for registering a facility.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFacilityRequest {
    pub name: String,
    pub facility_type: FacilityType,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub blood_types_available: Vec<BloodType>,
}

impl CreateFacilityRequest {
    /// Validates field contents beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty");
        }
        if self.address.trim().is_empty() {
            return Err("address must not be empty");
        }
        Ok(())
    }
}

/// Query filters for browsing facilities.
#[derive(Debug, Deserialize)]
pub struct FacilityQuery {
    pub city: Option<String>,
    pub facility_type: Option<FacilityType>,
}

/// Registers a new medical facility.
async fn create_facility(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(request): Json<CreateFacilityRequest>,
) -> Result<Json<MedicalFacility>, (StatusCode, &'static str)> {
    if let Err(msg) = request.validate() {
        return Err((StatusCode::BAD_REQUEST, msg));
    }

    let id = FacilityId::random().map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to generate facility id",
        )
    })?;

    let facility = MedicalFacility {
        id,
        name: request.name,
        facility_type: request.facility_type,
        address: request.address,
        city: request.city,
        state: request.state,
        phone: request.phone,
        email: request.email,
        services: request.services,
        blood_types_available: request.blood_types_available,
        created_at: Utc::now(),
    };

    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::facility::create(&mut tx, &facility).await {
        Ok(()) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(facility))
        }
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to create facility",
        )),
    }
}

/// Browses facilities, sorted by name.
async fn list_facilities(
    State(state): State<AppState>,
    Query(query): Query<FacilityQuery>,
) -> Result<Json<Vec<MedicalFacility>>, (StatusCode, &'static str)> {
    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::facility::list(&mut tx, query.city.as_deref(), query.facility_type).await {
        Ok(facilities) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(facilities))
        }
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to list facilities",
        )),
    }
}

/// Gets a single facility by id.
async fn get_facility(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MedicalFacility>, (StatusCode, &'static str)> {
    let facility_id: FacilityId = id
        .parse()
        .map_err(|_e| (StatusCode::BAD_REQUEST, "invalid facility id"))?;

    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::facility::get(&mut tx, &facility_id).await {
        Ok(Some(facility)) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(facility))
        }
        Ok(None) => Err((StatusCode::NOT_FOUND, "medical facility not found")),
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to retrieve facility",
        )),
    }
}

/// Creates an Axum router with the medical facility endpoints.
///
/// # Routes
/// - `POST /medical-facilities` - Register a facility (bearer-protected)
/// - `GET /medical-facilities` - Browse facilities with filters
/// - `GET /medical-facilities/{id}` - Get a single facility
pub fn create_facility_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/medical-facilities",
            get(list_facilities).post(create_facility),
        )
        .route("/medical-facilities/:id", get(get_facility))
        .with_state(state)
}
