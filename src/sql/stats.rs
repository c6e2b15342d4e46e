//! Platform-wide counters for PostgreSQL database.

use sqlx::{Postgres, Transaction};

use super::SqlResult;
use crate::{PlatformStats, StoreError};

/// Gathers the platform-wide counters in one round trip.
pub async fn platform(tx: &mut Transaction<'_, Postgres>) -> SqlResult<PlatformStats> {
    let result: Result<(i64, i64, i64, i64, i64), sqlx::Error> = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users),
            (SELECT COUNT(*) FROM users WHERE role = 'donor'),
            (SELECT COUNT(*) FROM blood_requests WHERE status = 'active'),
            (SELECT COUNT(*) FROM blood_requests WHERE status = 'fulfilled'),
            (SELECT COUNT(*) FROM medical_facilities)
        "#,
    )
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok((total_users, total_donors, active_requests, fulfilled_requests, total_facilities)) => {
            Ok(PlatformStats {
                total_users,
                total_donors,
                active_requests,
                fulfilled_requests,
                total_facilities,
            })
        }
        Err(e) => {
            eprintln!("Database error gathering stats: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BloodType, User, UserId, UserRole};
    use chrono::Utc;

    #[tokio::test]
    async fn counts_start_at_zero() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let stats = platform(&mut tx).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(
            stats,
            PlatformStats {
                total_users: 0,
                total_donors: 0,
                active_requests: 0,
                fulfilled_requests: 0,
                total_facilities: 0,
            }
        );
    }

    #[tokio::test]
    async fn counts_reflect_rows() {
        let pool = super::super::tests::setup_test_db().await;

        let donor = User {
            id: UserId::random().unwrap(),
            email: "stats_donor@example.com".to_string(),
            full_name: "Stats Donor".to_string(),
            role: UserRole::Donor,
            blood_type: Some(BloodType::APositive),
            phone: None,
            location: None,
            city: None,
            state: None,
            available_to_donate: true,
            created_at: Utc::now(),
        };
        let mut beneficiary = donor.clone();
        beneficiary.id = UserId::random().unwrap();
        beneficiary.email = "stats_beneficiary@example.com".to_string();
        beneficiary.role = UserRole::Beneficiary;

        let mut tx = pool.begin().await.unwrap();
        crate::sql::user::create(&mut tx, &donor, "hash").await.unwrap();
        crate::sql::user::create(&mut tx, &beneficiary, "hash")
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let stats = platform(&mut tx).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_donors, 1);
        assert_eq!(stats.active_requests, 0);
    }
}
