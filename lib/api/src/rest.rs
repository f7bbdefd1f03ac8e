use actix_cors::Cors;
use actix_web::{error::InternalError, http::StatusCode, web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use skillmatch_catalog::{SampleQuestionBook, SampleView};
use skillmatch_core::{Error, ItemId, RecommendationService, ScoredResult};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct RecommendRequest {
    query: String,
    /// Signed so that negative counts reach us and get a proper 400
    top_n: Option<i64>,
}

#[derive(Serialize)]
struct RecommendResponse {
    results: Vec<RecommendationEntry>,
}

#[derive(Serialize)]
struct RecommendationEntry {
    id: ItemId,
    name: String,
    description: String,
    category: Option<String>,
    score: f32,
}

impl From<ScoredResult> for RecommendationEntry {
    fn from(result: ScoredResult) -> Self {
        Self {
            id: result.item.id,
            name: result.item.name,
            description: result.item.description,
            category: result.item.category,
            score: round_score(result.score),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    items: usize,
    model: &'a str,
    dimension: usize,
}

#[derive(Deserialize)]
struct SampleQuery {
    #[serde(default)]
    show: bool,
}

#[derive(Serialize)]
struct SampleQuestionsResponse {
    id: ItemId,
    name: String,
    visible: bool,
    available: bool,
    questions: Vec<String>,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        service: Arc<RecommendationService>,
        samples: Arc<SampleQuestionBook>,
        port: u16,
    ) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(service.clone()))
                .app_data(web::Data::new(samples.clone()))
                .configure(RestApi::routes)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register the endpoints. Expects `Arc<RecommendationService>` and
    /// `Arc<SampleQuestionBook>` as app data.
    pub fn routes(cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
            let body = serde_json::json!({ "error": err.to_string() });
            InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        }))
        .route("/recommend", web::post().to(recommend))
        .route("/health", web::get().to(health))
        .route("/items/{id}/sample-questions", web::get().to(sample_questions));
    }
}

async fn recommend(
    service: web::Data<Arc<RecommendationService>>,
    req: web::Json<RecommendRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    let top_n = match req.top_n {
        None => service.config().default_top_n,
        Some(n) if n <= 0 => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("top_n must be a positive integer, got {}", n)
            })));
        }
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
    };

    match service.recommend(&req.query, top_n).await {
        Ok(results) => {
            debug!("POST /recommend returned {} results", results.len());
            let results = results.into_iter().map(RecommendationEntry::from).collect();
            Ok(HttpResponse::Ok().json(RecommendResponse { results }))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

async fn health(service: web::Data<Arc<RecommendationService>>) -> ActixResult<HttpResponse> {
    let index = service.index();
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        items: index.len(),
        model: service.encoder_model(),
        dimension: index.dim(),
    }))
}

async fn sample_questions(
    service: web::Data<Arc<RecommendationService>>,
    samples: web::Data<Arc<SampleQuestionBook>>,
    path: web::Path<String>,
    query: web::Query<SampleQuery>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    let item = match service.index().find(&id) {
        Some(item) => item,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("item '{}' not found", id)
            })));
        }
    };

    let (available, questions) = match samples.view(item, query.show) {
        SampleView::Questions(questions) => (true, questions),
        SampleView::Unavailable => (false, Vec::new()),
        SampleView::Hidden => (samples.questions_for(item).is_some(), Vec::new()),
    };

    Ok(HttpResponse::Ok().json(SampleQuestionsResponse {
        id: item.id.clone(),
        name: item.name.clone(),
        visible: query.show,
        available,
        questions,
    }))
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        Error::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::EncodingTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::Encoding(_) | Error::InvalidDimension { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &Error) -> HttpResponse {
    let status = status_for(error);
    if status.is_server_error() {
        warn!("Request failed with {}: {}", status, error);
    }
    HttpResponse::build(status).json(serde_json::json!({ "error": error.to_string() }))
}

fn round_score(score: f32) -> f32 {
    (score * 100.0).round() / 100.0
}
