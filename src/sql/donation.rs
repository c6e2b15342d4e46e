//! Donation history operations for PostgreSQL database.

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use super::SqlResult;
use crate::blood::BloodTypeParseError;
use crate::{DonationId, DonationRecord, RequestId, StoreError, UserId};

const DONATION_COLUMNS: &str = "donation_id, donor_id, donor_name, blood_request_id, blood_type, units_donated, donation_date, hospital_name, city";

fn donation_from_row(row: &PgRow) -> SqlResult<DonationRecord> {
    let id_bytes: Vec<u8> = row.try_get("donation_id")?;
    let id_bytes: [u8; 16] = id_bytes
        .try_into()
        .map_err(|_| StoreError::Internal("invalid donation_id length".to_string()))?;

    let donor_id: Vec<u8> = row.try_get("donor_id")?;
    let donor_id: [u8; 16] = donor_id
        .try_into()
        .map_err(|_| StoreError::Internal("invalid donor_id length".to_string()))?;

    let blood_request_id: Option<Vec<u8>> = row.try_get("blood_request_id")?;
    let blood_request_id = match blood_request_id {
        Some(bytes) => {
            let bytes: [u8; 16] = bytes.try_into().map_err(|_| {
                StoreError::Internal("invalid blood_request_id length".to_string())
            })?;
            Some(RequestId::new(bytes))
        }
        None => None,
    };

    let blood_type: String = row.try_get("blood_type")?;
    let blood_type = blood_type
        .parse()
        .map_err(|e: BloodTypeParseError| StoreError::Internal(e.to_string()))?;

    Ok(DonationRecord {
        id: DonationId::new(id_bytes),
        donor_id: UserId::new(donor_id),
        donor_name: row.try_get("donor_name")?,
        blood_request_id,
        blood_type,
        units_donated: row.try_get("units_donated")?,
        donation_date: row.try_get("donation_date")?,
        hospital_name: row.try_get("hospital_name")?,
        city: row.try_get("city")?,
    })
}

/// Creates a new donation record in the database.
///
/// # Returns
/// * `Ok(())` - Record created successfully
/// * `Err(StoreError::Internal)` - Database error
pub async fn create(tx: &mut Transaction<'_, Postgres>, record: &DonationRecord) -> SqlResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO donation_history (donation_id, donor_id, donor_name, blood_request_id, blood_type, units_donated, donation_date, hospital_name, city)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(record.id.as_bytes().as_slice())
    .bind(record.donor_id.as_bytes().as_slice())
    .bind(&record.donor_name)
    .bind(record.blood_request_id.map(|id| id.into_bytes().to_vec()))
    .bind(record.blood_type.as_str())
    .bind(record.units_donated)
    .bind(record.donation_date)
    .bind(&record.hospital_name)
    .bind(&record.city)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Database error creating donation record: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

/// Lists a donor's donation records, newest first.
///
/// Capped at 1000 rows.
pub async fn list_for_donor(
    tx: &mut Transaction<'_, Postgres>,
    donor_id: &UserId,
) -> SqlResult<Vec<DonationRecord>> {
    let sql = format!(
        r#"
        SELECT {}
        FROM donation_history
        WHERE donor_id = $1
        ORDER BY donation_date DESC
        LIMIT 1000
        "#,
        DONATION_COLUMNS
    );
    let result = sqlx::query(&sql)
        .bind(donor_id.as_bytes().as_slice())
        .fetch_all(&mut **tx)
        .await;

    match result {
        Ok(rows) => {
            let mut records = Vec::new();
            for row in rows {
                records.push(donation_from_row(&row)?);
            }
            Ok(records)
        }
        Err(e) => {
            eprintln!("Database error listing donation records: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BloodType, User, UserRole};
    use chrono::{Duration, Utc};

    async fn seed_donor(pool: &sqlx::PgPool, test_name: &str) -> User {
        use std::time::{SystemTime, UNIX_EPOCH};
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let user = User {
            id: UserId::random().unwrap(),
            email: format!("{}_{}@example.com", test_name, now),
            full_name: "Donating User".to_string(),
            role: UserRole::Donor,
            blood_type: Some(BloodType::OPositive),
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

    fn record_for(donor: &User, donation_date: chrono::DateTime<Utc>) -> DonationRecord {
        DonationRecord {
            id: DonationId::random().unwrap(),
            donor_id: donor.id,
            donor_name: donor.full_name.clone(),
            blood_request_id: None,
            blood_type: BloodType::OPositive,
            units_donated: 1,
            donation_date,
            hospital_name: "General Hospital".to_string(),
            city: "Springfield".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_list() {
        let pool = super::super::tests::setup_test_db().await;
        let donor = seed_donor(&pool, "donation_create").await;
        let record = record_for(&donor, Utc::now());

        let mut tx = pool.begin().await.unwrap();
        create(&mut tx, &record).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let records = list_for_donor(&mut tx, &donor.id).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record.id);
        assert_eq!(records[0].donor_id, donor.id);
        assert!(records[0].blood_request_id.is_none());
    }

    #[tokio::test]
    async fn list_is_scoped_to_donor_and_sorted() {
        let pool = super::super::tests::setup_test_db().await;
        let donor = seed_donor(&pool, "donation_scope_a").await;
        let other = seed_donor(&pool, "donation_scope_b").await;

        let older = record_for(&donor, Utc::now() - Duration::days(30));
        let newer = record_for(&donor, Utc::now());
        let theirs = record_for(&other, Utc::now());

        let mut tx = pool.begin().await.unwrap();
        for record in [&older, &newer, &theirs] {
            create(&mut tx, record).await.unwrap();
        }
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let records = list_for_donor(&mut tx, &donor.id).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, newer.id);
        assert_eq!(records[1].id, older.id);
    }

    #[tokio::test]
    async fn linked_donation_round_trips() {
        let pool = super::super::tests::setup_test_db().await;
        let donor = seed_donor(&pool, "donation_linked").await;

        let mut record = record_for(&donor, Utc::now());
        record.blood_request_id = Some(RequestId::new([7u8; 16]));

        let mut tx = pool.begin().await.unwrap();
        create(&mut tx, &record).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let records = list_for_donor(&mut tx, &donor.id).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(records[0].blood_request_id, Some(RequestId::new([7u8; 16])));
    }
}
