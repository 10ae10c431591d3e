use actix_multipart::form::{bytes::Bytes, MultipartForm};
use actix_web::{http::header, post, web, HttpResponse};
use askama::Template;
use serde::Deserialize;
use uuid::Uuid;

use crate::configuration::ScraperSettings;
use crate::domain::ExtractionResult;
use crate::services::{
    export_filename, results_to_csv, run_batch, work_items_from_csv, BatchSummary, PageExtractor,
};

#[derive(MultipartForm)]
struct UploadForm {
    file: Bytes,
}

#[derive(Deserialize)]
struct ProcessParams {
    format: Option<String>,
}

#[derive(Template)]
#[template(path = "results.html")]
struct ResultsTemplate {
    succeeded: usize,
    failed: usize,
    results: Vec<ExtractionResult>,
}

/// Takes the uploaded spreadsheet through the whole pipeline: validate, run
/// the batch, and hand back either a rendered table or the CSV export
/// (`?format=csv`). Nothing is kept between requests.
#[post("/process")]
async fn process(
    MultipartForm(form): MultipartForm<UploadForm>,
    params: web::Query<ProcessParams>,
    extractor: web::Data<PageExtractor>,
    settings: web::Data<ScraperSettings>,
) -> HttpResponse {
    let items = match work_items_from_csv(&form.file.data) {
        Ok(items) => items,
        Err(e) => {
            log::error!("Rejected uploaded file: {}", e);
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    };

    let batch_id = Uuid::new_v4();
    log::info!("Batch {} started with {} urls", batch_id, items.len());

    let results = run_batch(extractor.into_inner(), items, settings.get_ref()).await;

    let summary = BatchSummary::tally(&results);
    log::info!(
        "Batch {} finished: {} succeeded, {} failed",
        batch_id,
        summary.succeeded,
        summary.failed
    );

    match params.format.as_deref() {
        Some("csv") => match results_to_csv(&results) {
            Ok(bytes) => HttpResponse::Ok()
                .content_type("text/csv")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export_filename()),
                ))
                .body(bytes),
            Err(e) => {
                log::error!("Failed to serialize batch {} results: {:?}", batch_id, e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to build the results export"
                }))
            }
        },
        _ => HttpResponse::Ok().body(
            ResultsTemplate {
                succeeded: summary.succeeded,
                failed: summary.failed,
                results,
            }
            .render()
            .unwrap(),
        ),
    }
}
