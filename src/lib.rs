//! # Hemolink: Blood Donation Coordination
//!
//! Hemolink connects people who need blood with the donors and facilities
//! that can provide it. Beneficiaries post blood requests, donors browse and
//! fulfill them, facilities advertise their services and stock, and every
//! completed donation is recorded against the donor's history.
//!
//! This crate provides:
//!
//! - **Domain model**: strongly-typed identifiers, blood groups, roles,
//!   urgencies, and statuses that reject invalid wire forms at the boundary
//! - **Authentication**: bcrypt password hashing and stateless HS256 bearer
//!   tokens, with an extractor that authenticates protected handlers
//! - **HTTP API**: RESTful endpoints for registration, requests, matching,
//!   facilities, donation history, and platform stats
//! - **SQL layer**: per-table PostgreSQL operations behind explicit
//!   transactions
//!
//! ## Core Concepts
//!
//! ### Identifiers
//! Every collection has its own identifier type ([`UserId`], [`RequestId`],
//! [`FacilityId`], [`DonationId`]): 16 random bytes encoded as URL-safe
//! base64 with a collection prefix (e.g. `user:`, `bloodreq:`). Parsing and
//! display round-trip exactly, and an id from one collection never parses as
//! another's.
//!
//! ### Requests and Matching
//! A blood request names a patient, blood group, unit count, urgency, and
//! the hospital that needs it. Donor matching is a plain filter over
//! registered donors: exact blood-group equality, availability, and an
//! optional city/state narrowing. There is no compatibility matrix.
//!
//! ### Authentication
//! Registration stores a bcrypt hash and returns a signed token; every
//! protected endpoint verifies the bearer token and loads the caller's user
//! row before running.
//!
//! ## Architecture
//!
//! The system follows a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ HTTP API Layer (Axum routes)            │
//! ├─────────────────────────────────────────┤
//! │ Auth (bcrypt + bearer tokens)           │
//! ├─────────────────────────────────────────┤
//! │ SQL Operations (per-table functions)    │
//! ├─────────────────────────────────────────┤
//! │ PostgreSQL (sqlx pool + transactions)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage Examples
//!
//! ### Identifiers
//!
//! ```rust
//! # use hemolink::UserId;
//! let id = UserId::new([1u8; 16]);
//! let s = id.to_string(); // "user:AQEBAQEBAQEBAQEBAQEBAQ"
//!
//! let parsed: UserId = s.parse().unwrap();
//! assert_eq!(id, parsed);
//! ```
//!
//! ### Tokens
//!
//! ```rust
//! # use hemolink::{AuthConfig, BloodType, User, UserId, UserRole};
//! # use chrono::Utc;
//! let auth = AuthConfig::new("secret");
//! let user = User {
//!     id: UserId::new([1u8; 16]),
//!     email: "donor@example.com".to_string(),
//!     full_name: "Alex Doe".to_string(),
//!     role: UserRole::Donor,
//!     blood_type: Some(BloodType::OPositive),
//!     phone: None,
//!     location: None,
//!     city: None,
//!     state: None,
//!     available_to_donate: true,
//!     created_at: Utc::now(),
//! };
//!
//! let token = auth.issue_token(&user).unwrap();
//! let claims = auth.verify_token(&token).unwrap();
//! assert_eq!(claims.sub, user.id.to_string());
//! ```

mod auth;
mod blood;
mod blood_request;
mod donation;
mod errors;
mod facility;
mod id;
mod state;
mod stats;
mod user;

/// PostgreSQL operations, organized by table.
pub mod sql;

/// Command-line interface utilities for program termination and output formatting.
pub mod cli_utils;

/// Command-line interface command handlers for the hemoctl binary.
pub mod commands;

/// HTTP client utilities for interacting with a hemolink daemon.
pub mod http_utils;

pub use auth::{
    AuthConfig, AuthUser, Claims, LoginRequest, RegisterRequest, TokenError, TokenResponse,
    create_auth_router, hash_password, verify_password,
};
pub use blood::{BloodType, BloodTypeParseError};
pub use blood_request::{
    BloodRequest, BloodRequestQuery, CreateBloodRequestRequest, RequestStatus,
    RequestStatusParseError, UpdateStatusResponse, Urgency, UrgencyParseError,
    create_blood_request_router,
};
pub use donation::{DonationRecord, RecordDonationRequest, create_donation_router};
pub use errors::StoreError;
pub use facility::{
    CreateFacilityRequest, FacilityQuery, FacilityType, FacilityTypeParseError, MedicalFacility,
    create_facility_router,
};
pub use id::{
    DonationId, DonationIdParseError, FacilityId, FacilityIdParseError, RequestId,
    RequestIdParseError, UserId, UserIdParseError,
};
pub use state::AppState;
pub use stats::{PlatformStats, create_stats_router};
pub use user::{
    DonorMatchQuery, User, UserRole, UserRoleParseError, create_donor_router, is_valid_email,
};
