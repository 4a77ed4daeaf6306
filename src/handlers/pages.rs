use actix_web::{http::header::ContentType, web, HttpRequest, HttpResponse};
use askama::Template;
use serde_json::json;
use sqlx::SqlitePool;

use crate::csrf::{self, CsrfSigner};
use crate::db::cafes;
use crate::errors::AppError;
use crate::models::form::{validate_cafe_form, CafeForm, FieldErrors, FormOutcome};
use crate::templates::IndexTemplate;

fn render_form(
    form: &CafeForm,
    errors: &FieldErrors,
    signer: &CsrfSigner,
    client_id: &str,
) -> Result<HttpResponse, AppError> {
    let page = IndexTemplate::new(form, errors, &signer.issue(client_id)).render()?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .cookie(csrf::client_cookie(client_id))
        .body(page))
}

pub async fn home(
    req: HttpRequest,
    signer: web::Data<CsrfSigner>,
) -> Result<HttpResponse, AppError> {
    let client_id = csrf::client_id_or_new(&req);
    render_form(&CafeForm::default(), &FieldErrors::default(), &signer, &client_id)
}

pub async fn add_cafe(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    signer: web::Data<CsrfSigner>,
    form: web::Form<CafeForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let mut outcome = validate_cafe_form(&form);
    if let Err(e) = signer.verify(&form.csrf_token, csrf::client_id(&req).as_deref()) {
        outcome = outcome.with_error("csrf_token", e.to_string());
    }

    let new_cafe = match outcome {
        FormOutcome::Valid(new_cafe) => new_cafe,
        FormOutcome::Invalid(errors) => {
            log::info!("Rejected cafe submission: {errors:?}");
            let client_id = csrf::client_id_or_new(&req);
            return render_form(&form, &errors, &signer, &client_id);
        }
    };

    let cafe = cafes::insert(pool.get_ref(), &new_cafe)
        .await
        .inspect_err(|e| log::warn!("Error adding cafe: {e}"))?;

    log::info!("Cafe added: {} (id {})", cafe.name, cafe.id);
    Ok(HttpResponse::Ok().json(json!({
        "response": { "session": "Cafe added successfully" }
    })))
}
