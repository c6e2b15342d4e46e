//! Medical facility operations for PostgreSQL database.

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use super::SqlResult;
use crate::blood::BloodTypeParseError;
use crate::facility::FacilityTypeParseError;
use crate::{BloodType, FacilityId, FacilityType, MedicalFacility, StoreError};

const FACILITY_COLUMNS: &str = "facility_id, name, facility_type, address, city, state, phone, email, services, blood_types_available, created_at";

fn facility_from_row(row: &PgRow) -> SqlResult<MedicalFacility> {
    let id_bytes: Vec<u8> = row.try_get("facility_id")?;
    let id_bytes: [u8; 16] = id_bytes
        .try_into()
        .map_err(|_| StoreError::Internal("invalid facility_id length".to_string()))?;

    let facility_type: String = row.try_get("facility_type")?;
    let facility_type = facility_type
        .parse()
        .map_err(|e: FacilityTypeParseError| StoreError::Internal(e.to_string()))?;

    let blood_types: Vec<String> = row.try_get("blood_types_available")?;
    let mut blood_types_available = Vec::with_capacity(blood_types.len());
    for bt in blood_types {
        blood_types_available.push(
            bt.parse::<BloodType>()
                .map_err(|e: BloodTypeParseError| StoreError::Internal(e.to_string()))?,
        );
    }

    Ok(MedicalFacility {
        id: FacilityId::new(id_bytes),
        name: row.try_get("name")?,
        facility_type,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        services: row.try_get("services")?,
        blood_types_available,
        created_at: row.try_get("created_at")?,
    })
}

/// Creates a new medical facility in the database.
///
/// # Returns
/// * `Ok(())` - Facility created successfully
/// * `Err(StoreError::Internal)` - Database error
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    facility: &MedicalFacility,
) -> SqlResult<()> {
    let blood_types: Vec<String> = facility
        .blood_types_available
        .iter()
        .map(|bt| bt.as_str().to_string())
        .collect();

    let result = sqlx::query(
        r#"
        INSERT INTO medical_facilities (facility_id, name, facility_type, address, city, state, phone, email, services, blood_types_available, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(facility.id.as_bytes().as_slice())
    .bind(&facility.name)
    .bind(facility.facility_type.as_str())
    .bind(&facility.address)
    .bind(&facility.city)
    .bind(&facility.state)
    .bind(&facility.phone)
    .bind(&facility.email)
    .bind(&facility.services)
    .bind(blood_types)
    .bind(facility.created_at)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Database error creating facility: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

/// Retrieves a facility by id.
///
/// # Returns
/// * `Ok(Some(MedicalFacility))` - Facility found
/// * `Ok(None)` - Facility not found
/// * `Err(StoreError::Internal)` - Database error
pub async fn get(
    tx: &mut Transaction<'_, Postgres>,
    id: &FacilityId,
) -> SqlResult<Option<MedicalFacility>> {
    let sql = format!(
        "SELECT {} FROM medical_facilities WHERE facility_id = $1",
        FACILITY_COLUMNS
    );
    let result = sqlx::query(&sql)
        .bind(id.as_bytes().as_slice())
        .fetch_optional(&mut **tx)
        .await;

    match result {
        Ok(Some(row)) => Ok(Some(facility_from_row(&row)?)),
        Ok(None) => Ok(None),
        Err(e) => {
            eprintln!("Database error getting facility: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

/// Lists facilities sorted by name, optionally narrowed by city and type.
///
/// Capped at 1000 rows.
pub async fn list(
    tx: &mut Transaction<'_, Postgres>,
    city: Option<&str>,
    facility_type: Option<FacilityType>,
) -> SqlResult<Vec<MedicalFacility>> {
    let sql = format!(
        r#"
        SELECT {}
        FROM medical_facilities
        WHERE ($1::TEXT IS NULL OR city = $1)
          AND ($2::TEXT IS NULL OR facility_type = $2)
        ORDER BY name ASC
        LIMIT 1000
        "#,
        FACILITY_COLUMNS
    );
    let result = sqlx::query(&sql)
        .bind(city)
        .bind(facility_type.map(|ft| ft.as_str()))
        .fetch_all(&mut **tx)
        .await;

    match result {
        Ok(rows) => {
            let mut facilities = Vec::new();
            for row in rows {
                facilities.push(facility_from_row(&row)?);
            }
            Ok(facilities)
        }
        Err(e) => {
            eprintln!("Database error listing facilities: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn facility(name: &str, city: &str, facility_type: FacilityType) -> MedicalFacility {
        MedicalFacility {
            id: FacilityId::random().unwrap(),
            name: name.to_string(),
            facility_type,
            address: "1 Main St".to_string(),
            city: city.to_string(),
            state: "IL".to_string(),
            phone: "555-0100".to_string(),
            email: None,
            services: vec!["blood_bank".to_string()],
            blood_types_available: vec![BloodType::OPositive, BloodType::ONegative],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_and_get() {
        let pool = super::super::tests::setup_test_db().await;
        let created = facility("City Blood Bank", "Springfield", FacilityType::BloodBank);

        let mut tx = pool.begin().await.unwrap();
        create(&mut tx, &created).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let fetched = get(&mut tx, &created.id).await.unwrap().unwrap();
        tx.commit().await.unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.facility_type, FacilityType::BloodBank);
        assert_eq!(fetched.services, vec!["blood_bank".to_string()]);
        assert_eq!(
            fetched.blood_types_available,
            vec![BloodType::OPositive, BloodType::ONegative]
        );
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let fetched = get(&mut tx, &FacilityId::new([0u8; 16])).await.unwrap();
        tx.commit().await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn list_sorts_by_name_and_filters() {
        let pool = super::super::tests::setup_test_db().await;

        let zeta = facility("Zeta Clinic", "Springfield", FacilityType::Clinic);
        let alpha = facility("Alpha Hospital", "Springfield", FacilityType::Hospital);
        let other_city = facility("Boston General", "Boston", FacilityType::Hospital);

        let mut tx = pool.begin().await.unwrap();
        for f in [&zeta, &alpha, &other_city] {
            create(&mut tx, f).await.unwrap();
        }
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let springfield = list(&mut tx, Some("Springfield"), None).await.unwrap();
        let hospitals = list(&mut tx, None, Some(FacilityType::Hospital)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(springfield.len(), 2);
        assert_eq!(springfield[0].name, "Alpha Hospital");
        assert_eq!(springfield[1].name, "Zeta Clinic");

        assert_eq!(hospitals.len(), 2);
        assert!(hospitals.iter().all(|f| f.facility_type == FacilityType::Hospital));
    }
}
