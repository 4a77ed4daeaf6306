use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::cafes;
use crate::errors::AppError;

#[derive(Deserialize)]
pub struct SearchParams {
    pub loc: Option<String>,
}

#[derive(Deserialize)]
pub struct PriceParams {
    pub new_price: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub api_key: Option<String>,
}

pub async fn get_all_cafes(pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let all = cafes::all(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(all))
}

pub async fn get_random_cafe(pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    match cafes::random(pool.get_ref()).await? {
        Some(cafe) => {
            log::info!("Retrieved random cafe: {}", cafe.name);
            Ok(HttpResponse::Ok().json(cafe))
        }
        None => {
            log::info!("No cafes found.");
            Err(AppError::NotFound("No cafes found.".to_string()))
        }
    }
}

pub async fn search_cafes(
    pool: web::Data<SqlitePool>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let location = params
        .loc
        .as_deref()
        .filter(|loc| !loc.is_empty())
        .ok_or_else(|| {
            AppError::MissingParameter(
                "Error: Missing location parameter. Please provide 'loc' in the query string."
                    .to_string(),
            )
        })?;

    let found = cafes::by_location(pool.get_ref(), location).await?;
    if found.is_empty() {
        return Ok(HttpResponse::Ok()
            .json(json!({ "message": "No cafes found for the specified location." })));
    }

    Ok(HttpResponse::Ok().json(found))
}

pub async fn update_price(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    params: web::Query<PriceParams>,
) -> Result<HttpResponse, AppError> {
    let cafe_name = path.into_inner();

    if cafes::find_by_name(pool.get_ref(), &cafe_name).await?.is_none() {
        return Err(AppError::cafe_not_found());
    }

    let Some(new_price) = params.into_inner().new_price else {
        return Err(AppError::MissingPrice);
    };

    if !cafes::update_price(pool.get_ref(), &cafe_name, &new_price).await? {
        return Err(AppError::cafe_not_found());
    }

    log::info!("Updated price of {cafe_name} to {new_price}");
    Ok(HttpResponse::Ok().json(json!({
        "response": { "session": "Successfully updated the price." }
    })))
}

pub async fn delete_cafe(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    path: web::Path<String>,
    params: web::Query<DeleteParams>,
) -> Result<HttpResponse, AppError> {
    let cafe_name = path.into_inner();

    if params.api_key.as_deref() != Some(config.api_key.as_str()) {
        log::warn!("Rejected delete of {cafe_name}: invalid key");
        return Err(AppError::Unauthorized);
    }

    if !cafes::delete_by_name(pool.get_ref(), &cafe_name).await? {
        return Err(AppError::cafe_not_found());
    }

    log::info!("Deleted cafe {cafe_name}");
    Ok(HttpResponse::Ok().json(json!({
        "response": { "success": "Successfully deleted the cafe." }
    })))
}
