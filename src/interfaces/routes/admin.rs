use actix_web::web;

use crate::handlers::projects;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(
                web::resource("")
                    .route(web::get().to(projects::admin_dashboard))
            )
            .service(
                web::resource("/projects")
                    .route(web::get().to(projects::list_projects))
                    .route(web::post().to(projects::create_project))
            )
            // Static segments before `{project_id}` so they win the match.
            .service(
                web::resource("/projects/new")
                    .route(web::get().to(projects::new_project_form))
            )
            .service(
                web::resource("/projects/validate")
                    .route(web::post().to(projects::validate_project))
            )
            .service(
                web::resource("/projects/{project_id}")
                    .route(web::get().to(projects::get_project))
                    .route(web::put().to(projects::replace_project))
                    .route(web::delete().to(projects::delete_project))
            )
    );
}
