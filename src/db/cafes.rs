use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::cafe::{Cafe, NewCafe};

const COLUMNS: &str = "id, name, map_url, img_url, location, seats, has_toilet, has_wifi, \
                       has_sockets, can_take_calls, coffee_price";

pub async fn all(pool: &SqlitePool) -> Result<Vec<Cafe>, AppError> {
    let cafes = sqlx::query_as::<_, Cafe>(&format!("SELECT {COLUMNS} FROM cafe ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(cafes)
}

pub async fn random(pool: &SqlitePool) -> Result<Option<Cafe>, AppError> {
    let cafe = sqlx::query_as::<_, Cafe>(&format!(
        "SELECT {COLUMNS} FROM cafe ORDER BY RANDOM() LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;
    Ok(cafe)
}

/// Exact, case-sensitive match on `location`.
pub async fn by_location(pool: &SqlitePool, location: &str) -> Result<Vec<Cafe>, AppError> {
    let cafes = sqlx::query_as::<_, Cafe>(&format!(
        "SELECT {COLUMNS} FROM cafe WHERE location = ? ORDER BY id"
    ))
    .bind(location)
    .fetch_all(pool)
    .await?;
    Ok(cafes)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Cafe>, AppError> {
    let cafe = sqlx::query_as::<_, Cafe>(&format!("SELECT {COLUMNS} FROM cafe WHERE name = ?"))
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(cafe)
}

/// Inserts a cafe. A name that is already taken is reported as
/// [`AppError::Conflict`] and leaves the table untouched.
pub async fn insert(pool: &SqlitePool, cafe: &NewCafe) -> Result<Cafe, AppError> {
    let inserted = sqlx::query_as::<_, Cafe>(&format!(
        r#"
        INSERT INTO cafe (name, map_url, img_url, location, seats, has_toilet, has_wifi,
                          has_sockets, can_take_calls, coffee_price)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&cafe.name)
    .bind(&cafe.map_url)
    .bind(&cafe.img_url)
    .bind(&cafe.location)
    .bind(&cafe.seats)
    .bind(cafe.has_toilet)
    .bind(cafe.has_wifi)
    .bind(cafe.has_sockets)
    .bind(cafe.can_take_calls)
    .bind(&cafe.coffee_price)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(cafe) => Ok(cafe),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
            format!("A cafe named '{}' already exists.", cafe.name),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Returns `false` when no cafe has that name.
pub async fn update_price(pool: &SqlitePool, name: &str, price: &str) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE cafe SET coffee_price = ? WHERE name = ?")
        .bind(price)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns `false` when no cafe has that name.
pub async fn delete_by_name(pool: &SqlitePool, name: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM cafe WHERE name = ?")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
pub(crate) fn sample(name: &str, location: &str) -> NewCafe {
    NewCafe {
        name: name.to_string(),
        map_url: format!("https://maps.example/{name}"),
        img_url: format!("https://img.example/{name}.png"),
        location: location.to_string(),
        seats: "10-20".to_string(),
        has_toilet: true,
        has_wifi: true,
        has_sockets: false,
        can_take_calls: false,
        coffee_price: Some("£2.40".to_string()),
    }
}
