use actix_web::{get, http::header, post, web, HttpResponse};
use askama::Template;
use serde::Deserialize;

use crate::configuration::AuthSettings;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {}

#[get("/login")]
async fn login_form() -> HttpResponse {
    HttpResponse::Ok().body(LoginTemplate {}.render().unwrap())
}

#[derive(Deserialize)]
struct LoginFormData {
    username: String,
    password: String,
}

/// Checks credentials against configuration. Stateless on purpose: whatever
/// session the caller wants to keep is theirs to manage.
#[post("/login")]
async fn login(form: web::Form<LoginFormData>, auth: web::Data<AuthSettings>) -> HttpResponse {
    if form.username == auth.username && form.password == auth.password {
        return HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/app/upload"))
            .finish();
    }

    log::info!("Rejected login attempt for user {}", form.username);
    HttpResponse::Unauthorized().json(serde_json::json!({
        "error": "Invalid username or password"
    }))
}
