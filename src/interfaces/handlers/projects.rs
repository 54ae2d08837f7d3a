use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::project::{NewProjectRequest, ProjectFormResponse},
    errors::AppError,
    use_cases::extractors::AdminClaims,
    AppState,
};

#[instrument(skip(_claims, state))]
pub async fn admin_dashboard(
    _claims: AdminClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let dashboard = state.project_handler.dashboard().await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

#[instrument(skip(_claims, state))]
pub async fn list_projects(
    _claims: AdminClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let projects = state.project_handler.list_projects().await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(_claims))]
pub async fn new_project_form(_claims: AdminClaims) -> impl Responder {
    HttpResponse::Ok().json(ProjectFormResponse::new())
}

/// Non-authoritative check used while the form is being filled in.
#[instrument(skip(_claims, state, draft))]
pub async fn validate_project(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    draft: web::Json<NewProjectRequest>,
) -> Result<impl Responder, AppError> {
    state.project_handler.validate_draft(&draft)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "valid": true })))
}

#[instrument(skip(_claims, state, data))]
pub async fn create_project(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    data: web::Json<NewProjectRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.project_handler
        .create_project(data.into_inner())
        .await?;

    Ok(HttpResponse::Created()
        .insert_header(("Location", response.redirect_to.clone()))
        .json(response))
}

#[instrument(skip(_claims, state))]
pub async fn get_project(
    _claims: AdminClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.get_project(&project_id).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_claims, state, data))]
pub async fn replace_project(
    _claims: AdminClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<NewProjectRequest>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler
        .replace_project(&project_id, data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_claims, state))]
pub async fn delete_project(
    _claims: AdminClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.project_handler.delete_project(&project_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
