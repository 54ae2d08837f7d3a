use actix_web::web;

use crate::handlers::{home::home, system::health_check};

mod admin;
mod api;
mod auth;
mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(json_error::config_routes);

    cfg.service(home);
    cfg.service(health_check);

    cfg.configure(auth::config_routes)
        .configure(admin::config_routes)
        .configure(api::config_routes);
}
