use actix_web::{get, HttpResponse};
use askama::Template;

#[derive(Template)]
#[template(path = "upload.html")]
struct UploadTemplate {}

#[get("/upload")]
async fn upload() -> HttpResponse {
    HttpResponse::Ok().body(UploadTemplate {}.render().unwrap())
}
