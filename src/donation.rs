use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::{AppState, BloodType, DonationId, RequestId, UserId, UserRole};

/////////////////////////////////////////// DonationRecord ////////////////////////////////////////

/// One completed donation in a donor's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub id: DonationId,
    pub donor_id: UserId,
    pub donor_name: String,
    pub blood_request_id: Option<RequestId>,
    pub blood_type: BloodType,
    pub units_donated: i32,
    pub donation_date: DateTime<Utc>,
    pub hospital_name: String,
    pub city: String,
}

////////////////////////////////////////////// Routes //////////////////////////////////////////////

/// Request structure for recording a donation.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordDonationRequest {
    #[serde(default)]
    pub blood_request_id: Option<RequestId>,
    pub blood_type: BloodType,
    pub units_donated: i32,
    pub hospital_name: String,
    pub city: String,
}

impl RecordDonationRequest {
    /// Validates field contents beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.hospital_name.trim().is_empty() {
            return Err("hospital_name must not be empty");
        }
        if self.units_donated < 1 {
            return Err("units_donated must be at least 1");
        }
        Ok(())
    }
}

/// Records a donation for the authenticated donor.
///
/// Only donors may record donations; other roles get 403.
async fn record_donation(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<RecordDonationRequest>,
) -> Result<Json<DonationRecord>, (StatusCode, &'static str)> {
    if user.role != UserRole::Donor {
        return Err((StatusCode::FORBIDDEN, "only donors can record donations"));
    }
    if let Err(msg) = request.validate() {
        return Err((StatusCode::BAD_REQUEST, msg));
    }

    let id = DonationId::random().map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to generate donation id",
        )
    })?;

    let record = DonationRecord {
        id,
        donor_id: user.id,
        donor_name: user.full_name,
        blood_request_id: request.blood_request_id,
        blood_type: request.blood_type,
        units_donated: request.units_donated,
        donation_date: Utc::now(),
        hospital_name: request.hospital_name,
        city: request.city,
    };

    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::donation::create(&mut tx, &record).await {
        Ok(()) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(record))
        }
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to record donation",
        )),
    }
}

/// Lists the authenticated caller's donation history, newest first.
async fn list_donations(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<DonationRecord>>, (StatusCode, &'static str)> {
    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::donation::list_for_donor(&mut tx, &user.id).await {
        Ok(records) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(records))
        }
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to list donations",
        )),
    }
}

/// Creates an Axum router with the donation history endpoints.
///
/// # Routes
/// - `POST /donation-history` - Record a donation (donors only)
/// - `GET /donation-history` - List the caller's donations
pub fn create_donation_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/donation-history",
            get(list_donations).post(record_donation),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_zero_units() {
        let request = RecordDonationRequest {
            blood_request_id: None,
            blood_type: BloodType::BNegative,
            units_donated: 0,
            hospital_name: "General Hospital".to_string(),
            city: "Springfield".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn validate_accepts_linked_donation() {
        let request = RecordDonationRequest {
            blood_request_id: Some(RequestId::new([2u8; 16])),
            blood_type: BloodType::BNegative,
            units_donated: 1,
            hospital_name: "General Hospital".to_string(),
            city: "Springfield".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn model_serde_round_trip() {
        let record = DonationRecord {
            id: DonationId::new([4u8; 16]),
            donor_id: UserId::new([1u8; 16]),
            donor_name: "Alex Doe".to_string(),
            blood_request_id: None,
            blood_type: BloodType::APositive,
            units_donated: 1,
            donation_date: Utc::now(),
            hospital_name: "General Hospital".to_string(),
            city: "Springfield".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: DonationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
