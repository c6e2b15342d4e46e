//! User operations for PostgreSQL database.
//!
//! This module owns the `users` table. The bcrypt hash is written and read
//! here only; [`UserRow`] is the single type that carries it, and it never
//! crosses the API boundary.

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use super::SqlResult;
use crate::blood::BloodTypeParseError;
use crate::user::UserRoleParseError;
use crate::{BloodType, StoreError, User, UserId};

/// A user row joined with its stored password hash.
#[derive(Debug, Clone)]
pub struct UserRow {
    /// The user, safe to serialize.
    pub user: User,
    /// The stored bcrypt hash.
    pub password_hash: String,
}

const USER_COLUMNS: &str = "user_id, email, full_name, role, blood_type, phone, location, city, state, available_to_donate, created_at";

fn user_from_row(row: &PgRow) -> SqlResult<User> {
    let id_bytes: Vec<u8> = row.try_get("user_id")?;
    let id_bytes: [u8; 16] = id_bytes
        .try_into()
        .map_err(|_| StoreError::Internal("invalid user_id length".to_string()))?;

    let role: String = row.try_get("role")?;
    let role = role
        .parse()
        .map_err(|e: UserRoleParseError| StoreError::Internal(e.to_string()))?;

    let blood_type: Option<String> = row.try_get("blood_type")?;
    let blood_type = match blood_type {
        Some(s) => Some(
            s.parse::<BloodType>()
                .map_err(|e: BloodTypeParseError| StoreError::Internal(e.to_string()))?,
        ),
        None => None,
    };

    Ok(User {
        id: UserId::new(id_bytes),
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        role,
        blood_type,
        phone: row.try_get("phone")?,
        location: row.try_get("location")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        available_to_donate: row.try_get("available_to_donate")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Creates a new user in the database.
///
/// # Arguments
/// * `tx` - PostgreSQL transaction
/// * `user` - The user to create
/// * `password_hash` - The bcrypt hash of the user's password
///
/// # Returns
/// * `Ok(())` - User created successfully
/// * `Err(StoreError::AlreadyExists)` - A user with this email already exists
/// * `Err(StoreError::Internal)` - Database error
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
    password_hash: &str,
) -> SqlResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (user_id, email, password_hash, full_name, role, blood_type, phone, location, city, state, available_to_donate, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(user.id.as_bytes().as_slice())
    .bind(&user.email)
    .bind(password_hash)
    .bind(&user.full_name)
    .bind(user.role.as_str())
    .bind(user.blood_type.map(|bt| bt.as_str()))
    .bind(&user.phone)
    .bind(&user.location)
    .bind(&user.city)
    .bind(&user.state)
    .bind(user.available_to_donate)
    .bind(user.created_at)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(StoreError::AlreadyExists)
        }
        Err(e) => {
            eprintln!("Database error creating user: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

/// Retrieves a user by id.
///
/// # Returns
/// * `Ok(Some(User))` - User found
/// * `Ok(None)` - User not found
/// * `Err(StoreError::Internal)` - Database error
pub async fn get(tx: &mut Transaction<'_, Postgres>, id: &UserId) -> SqlResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS);
    let result = sqlx::query(&sql)
        .bind(id.as_bytes().as_slice())
        .fetch_optional(&mut **tx)
        .await;

    match result {
        Ok(Some(row)) => Ok(Some(user_from_row(&row)?)),
        Ok(None) => Ok(None),
        Err(e) => {
            eprintln!("Database error getting user: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

/// Retrieves a user and their password hash by email.
///
/// # Returns
/// * `Ok(Some(UserRow))` - User found
/// * `Ok(None)` - No user with this email
/// * `Err(StoreError::Internal)` - Database error
pub async fn get_by_email(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
) -> SqlResult<Option<UserRow>> {
    let sql = format!(
        "SELECT {}, password_hash FROM users WHERE email = $1",
        USER_COLUMNS
    );
    let result = sqlx::query(&sql)
        .bind(email)
        .fetch_optional(&mut **tx)
        .await;

    match result {
        Ok(Some(row)) => {
            let user = user_from_row(&row)?;
            let password_hash: String = row.try_get("password_hash")?;
            Ok(Some(UserRow {
                user,
                password_hash,
            }))
        }
        Ok(None) => Ok(None),
        Err(e) => {
            eprintln!("Database error getting user by email: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}

/// Finds available donors with the requested blood group.
///
/// Matches role `donor`, exact blood-type equality, and availability,
/// optionally narrowed by city and state. Capped at 1000 rows.
pub async fn match_donors(
    tx: &mut Transaction<'_, Postgres>,
    blood_type: BloodType,
    city: Option<&str>,
    state: Option<&str>,
) -> SqlResult<Vec<User>> {
    let sql = format!(
        r#"
        SELECT {}
        FROM users
        WHERE role = 'donor'
          AND available_to_donate
          AND blood_type = $1
          AND ($2::TEXT IS NULL OR city = $2)
          AND ($3::TEXT IS NULL OR state = $3)
        ORDER BY created_at ASC
        LIMIT 1000
        "#,
        USER_COLUMNS
    );
    let result = sqlx::query(&sql)
        .bind(blood_type.as_str())
        .bind(city)
        .bind(state)
        .fetch_all(&mut **tx)
        .await;

    match result {
        Ok(rows) => {
            let mut donors = Vec::new();
            for row in rows {
                donors.push(user_from_row(&row)?);
            }
            Ok(donors)
        }
        Err(e) => {
            eprintln!("Database error matching donors: {}", e);
            Err(StoreError::Internal(e.to_string()))
        }
    }
}
