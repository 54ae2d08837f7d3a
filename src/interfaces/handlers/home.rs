use actix_web::{get, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, AppState};

/// Data for the public home page: site info plus the latest projects.
#[get("/")]
#[instrument(skip(state))]
pub async fn home(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let page = state.project_handler.home_page().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to my portfolio!",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "projects": page.projects,
    })))
}
