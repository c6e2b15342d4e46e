//! Blood request operations for PostgreSQL database.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use super::SqlResult;
use crate::blood::BloodTypeParseError;
use crate::blood_request::{RequestStatusParseError, UrgencyParseError};
use crate::{BloodRequest, BloodType, RequestId, RequestStatus, StoreError, Urgency, UserId};

const REQUEST_COLUMNS: &str = "request_id, patient_name, blood_type, units_needed, urgency, hospital_name, city, state, contact_phone, contact_email, reason, status, requested_by, requested_by_name, created_at, fulfilled_at";

fn request_from_row(row: &PgRow) -> SqlResult<BloodRequest> {
    let id_bytes: Vec<u8> = row.try_get("request_id")?;
    let id_bytes: [u8; 16] = id_bytes
        .try_into()
        .map_err(|_| StoreError::Internal("invalid request_id length".to_string()))?;

    let requested_by: Vec<u8> = row.try_get("requested_by")?;
    let requested_by: [u8; 16] = requested_by
        .try_into()
        .map_err(|_| StoreError::Internal("invalid requested_by length".to_string()))?;

    let blood_type: String = row.try_get("blood_type")?;
    let blood_type = blood_type
        .parse()
        .map_err(|e: BloodTypeParseError| StoreError::Internal(e.to_string()))?;

    let urgency: String = row.try_get("urgency")?;
    let urgency = urgency
        .parse()
        .map_err(|e: UrgencyParseError| StoreError::Internal(e.to_string()))?;

    let status: String = row.try_get("status")?;
    let status = status
        .parse()
        .map_err(|e: RequestStatusParseError| StoreError::Internal(e.to_string()))?;

    Ok(BloodRequest {
        id: RequestId::new(id_bytes),
        patient_name: row.try_get("patient_name")?,
        blood_type,
        units_needed: row.try_get("units_needed")?,
        urgency,
        hospital_name: row.try_get("hospital_name")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        contact_phone: row.try_get("contact_phone")?,
        contact_email: row.try_get("contact_email")?,
        reason: row.try_get("reason")?,
        status,
        requested_by: UserId::new(requested_by),
        requested_by_name: row.try_get("requested_by_name")?,
        created_at: row.try_get("created_at")?,
        fulfilled_at: row.try_get("fulfilled_at")?,
    })
}

/// Creates a new blood request in the database.
///
/// # Returns
/// * `Ok(())` - Request created successfully
/// * `Err(StoreError::Internal)` - Database error
pub async fn create(tx: &mut Transaction<'_, Postgres>, request: &BloodRequest) -> SqlResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO blood_requests (request_id, patient_name, blood_type, units_needed, urgency, hospital_name, city, state, contact_phone, contact_email, reason, status, requested_by, requested_by_name, created_at, fulfilled_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(request.id.as_bytes().as_slice())
    .bind(&request.patient_name)
    .bind(request.blood_type.as_str())
    .bind(request.units_needed)
    .bind(request.urgency.as_str())
    .bind(&request.hospital_name)
    .bind(&request.city)
    .bind(&request.state)
    .bind(&request.contact_phone)
    .bind(&request.contact_email)
    .bind(&request.reason)
    .bind(request.status.as_str())
    .bind(request.requested_by.as_bytes().as_slice())
    .bind(&request.requested_by_name)
    .bind(request.created_at)
    .bind(request.fulfilled_at)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Database error creating blood request: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

/// Retrieves a blood request by id.
///
/// # Returns
/// * `Ok(Some(BloodRequest))` - Request found
/// * `Ok(None)` - Request not found
/// * `Err(StoreError::Internal)` - Database error
pub async fn get(
    tx: &mut Transaction<'_, Postgres>,
    id: &RequestId,
) -> SqlResult<Option<BloodRequest>> {
    let sql = format!(
        "SELECT {} FROM blood_requests WHERE request_id = $1",
        REQUEST_COLUMNS
    );
    let result = sqlx::query(&sql)
        .bind(id.as_bytes().as_slice())
        .fetch_optional(&mut **tx)
        .await;

    match result {
        Ok(Some(row)) => Ok(Some(request_from_row(&row)?)),
        Ok(None) => Ok(None),
        Err(e) => {
            eprintln!("Database error getting blood request: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

/// Lists blood requests in the given status, newest first.
///
/// Optional filters narrow by blood group, city, and urgency. Capped at 1000
/// rows.
pub async fn list(
    tx: &mut Transaction<'_, Postgres>,
    status: RequestStatus,
    blood_type: Option<BloodType>,
    city: Option<&str>,
    urgency: Option<Urgency>,
) -> SqlResult<Vec<BloodRequest>> {
    let sql = format!(
        r#"
        SELECT {}
        FROM blood_requests
        WHERE status = $1
          AND ($2::TEXT IS NULL OR blood_type = $2)
          AND ($3::TEXT IS NULL OR city = $3)
          AND ($4::TEXT IS NULL OR urgency = $4)
        ORDER BY created_at DESC
        LIMIT 1000
        "#,
        REQUEST_COLUMNS
    );
    let result = sqlx::query(&sql)
        .bind(status.as_str())
        .bind(blood_type.map(|bt| bt.as_str()))
        .bind(city)
        .bind(urgency.map(|u| u.as_str()))
        .fetch_all(&mut **tx)
        .await;

    match result {
        Ok(rows) => {
            let mut requests = Vec::new();
            for row in rows {
                requests.push(request_from_row(&row)?);
            }
            Ok(requests)
        }
        Err(e) => {
            eprintln!("Database error listing blood requests: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

/// Updates a request's status and fulfillment timestamp.
///
/// # Returns
/// * `Ok(true)` - Request existed and was updated
/// * `Ok(false)` - Request did not exist
/// * `Err(StoreError::Internal)` - Database error
pub async fn update_status(
    tx: &mut Transaction<'_, Postgres>,
    id: &RequestId,
    status: RequestStatus,
    fulfilled_at: Option<DateTime<Utc>>,
) -> SqlResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE blood_requests
        SET status = $2, fulfilled_at = $3
        WHERE request_id = $1
        "#,
    )
    .bind(id.as_bytes().as_slice())
    .bind(status.as_str())
    .bind(fulfilled_at)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(result) => Ok(result.rows_affected() > 0),
        Err(e) => {
            eprintln!("Database error updating blood request status: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{User, UserRole};

    async fn seed_requester(pool: &sqlx::PgPool, test_name: &str) -> User {
        use std::time::{SystemTime, UNIX_EPOCH};
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let user = User {
            id: UserId::random().unwrap(),
            email: format!("{}_{}@example.com", test_name, now),
            full_name: "Requesting User".to_string(),
            role: UserRole::Beneficiary,
            blood_type: None,
            phone: None,
            location: None,
            city: None,
            state: None,
            available_to_donate: true,
            created_at: Utc::now(),
        };
        let mut tx = pool.begin().await.unwrap();
        crate::sql::user::create(&mut tx, &user, "hash").await.unwrap();
        tx.commit().await.unwrap();
        user
    }

    fn request_for(user: &User, blood_type: BloodType, city: &str, urgency: Urgency) -> BloodRequest {
        BloodRequest {
            id: RequestId::random().unwrap(),
            patient_name: "Jordan Smith".to_string(),
            blood_type,
            units_needed: 2,
            urgency,
            hospital_name: "General Hospital".to_string(),
            city: city.to_string(),
            state: "IL".to_string(),
            contact_phone: "555-0100".to_string(),
            contact_email: None,
            reason: None,
            status: RequestStatus::Active,
            requested_by: user.id,
            requested_by_name: user.full_name.clone(),
            created_at: Utc::now(),
            fulfilled_at: None,
        }
    }

    #[tokio::test]
    async fn create_and_get() {
        let pool = super::super::tests::setup_test_db().await;
        let user = seed_requester(&pool, "req_create_and_get").await;
        let request = request_for(&user, BloodType::APositive, "Springfield", Urgency::High);

        let mut tx = pool.begin().await.unwrap();
        create(&mut tx, &request).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let fetched = get(&mut tx, &request.id).await.unwrap().unwrap();
        tx.commit().await.unwrap();

        assert_eq!(fetched.id, request.id);
        assert_eq!(fetched.blood_type, BloodType::APositive);
        assert_eq!(fetched.status, RequestStatus::Active);
        assert_eq!(fetched.requested_by, user.id);
        assert!(fetched.fulfilled_at.is_none());
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let fetched = get(&mut tx, &RequestId::new([0u8; 16])).await.unwrap();
        tx.commit().await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn list_filters_by_type_city_and_urgency() {
        let pool = super::super::tests::setup_test_db().await;
        let user = seed_requester(&pool, "req_list_filters").await;

        let matching = request_for(&user, BloodType::ONegative, "Springfield", Urgency::Critical);
        let wrong_type = request_for(&user, BloodType::BPositive, "Springfield", Urgency::Critical);
        let wrong_city = request_for(&user, BloodType::ONegative, "Boston", Urgency::Critical);
        let wrong_urgency = request_for(&user, BloodType::ONegative, "Springfield", Urgency::Low);

        let mut tx = pool.begin().await.unwrap();
        for request in [&matching, &wrong_type, &wrong_city, &wrong_urgency] {
            create(&mut tx, request).await.unwrap();
        }
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let requests = list(
            &mut tx,
            RequestStatus::Active,
            Some(BloodType::ONegative),
            Some("Springfield"),
            Some(Urgency::Critical),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, matching.id);
    }

    #[tokio::test]
    async fn list_excludes_other_statuses() {
        let pool = super::super::tests::setup_test_db().await;
        let user = seed_requester(&pool, "req_list_status").await;
        let request = request_for(&user, BloodType::APositive, "Springfield", Urgency::Medium);

        let mut tx = pool.begin().await.unwrap();
        create(&mut tx, &request).await.unwrap();
        update_status(&mut tx, &request.id, RequestStatus::Cancelled, None)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let active = list(&mut tx, RequestStatus::Active, None, None, None)
            .await
            .unwrap();
        let cancelled = list(&mut tx, RequestStatus::Cancelled, None, None, None)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(active.is_empty());
        assert_eq!(cancelled.len(), 1);
    }

    #[tokio::test]
    async fn fulfill_stamps_timestamp() {
        let pool = super::super::tests::setup_test_db().await;
        let user = seed_requester(&pool, "req_fulfill").await;
        let request = request_for(&user, BloodType::AbPositive, "Springfield", Urgency::High);

        let mut tx = pool.begin().await.unwrap();
        create(&mut tx, &request).await.unwrap();
        tx.commit().await.unwrap();

        let fulfilled_at = Utc::now();
        let mut tx = pool.begin().await.unwrap();
        let updated = update_status(
            &mut tx,
            &request.id,
            RequestStatus::Fulfilled,
            Some(fulfilled_at),
        )
        .await
        .unwrap();
        assert!(updated);
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let fetched = get(&mut tx, &request.id).await.unwrap().unwrap();
        tx.commit().await.unwrap();

        assert_eq!(fetched.status, RequestStatus::Fulfilled);
        assert!(fetched.fulfilled_at.is_some());
    }

    #[tokio::test]
    async fn update_status_nonexistent() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let updated = update_status(
            &mut tx,
            &RequestId::new([0u8; 16]),
            RequestStatus::Cancelled,
            None,
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        assert!(!updated);
    }
}
