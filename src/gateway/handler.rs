use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

use super::error::GatewayError;
use super::payload::{MatchNamesRequest, MatchNamesResponse, RecipeRequest, RecipeResponse};
use super::state::AppState;
use super::{NAMECHEF_STATUS_HEADER, NAMECHEF_STATUS_MATCHED};

fn parse_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

fn with_status(status: &'static str, body: impl IntoResponse) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(NAMECHEF_STATUS_HEADER, HeaderValue::from_static(status));
    (StatusCode::OK, headers, body).into_response()
}

#[instrument(skip(state, body), fields(top_k = tracing::field::Empty))]
pub async fn match_names_handler(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: MatchNamesRequest = parse_body(body)?;

    let query = request.name.trim().to_string();
    if query.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "Name cannot be empty".to_string(),
        ));
    }

    let top_k = request.top_k.unwrap_or(state.default_top_k);
    if top_k == 0 {
        return Err(GatewayError::InvalidRequest(
            "top_k must be greater than 0".to_string(),
        ));
    }
    tracing::Span::current().record("top_k", top_k);

    let ranker = state.ranker.clone();
    let task = tokio::task::spawn_blocking(move || ranker.rank(&query, top_k));

    let ranked = tokio::time::timeout(state.request_timeout, task)
        .await
        .map_err(|_| GatewayError::Timeout(state.request_timeout))?
        .map_err(|e| GatewayError::InternalError(format!("ranking task failed: {}", e)))??;

    debug!(
        best = %ranked.best_match.name,
        score = ranked.best_match.combined_score,
        "Name match complete"
    );

    Ok(with_status(
        NAMECHEF_STATUS_MATCHED,
        Json(MatchNamesResponse::new(request.name, &ranked)),
    ))
}

#[instrument(skip(state, body), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn get_recipe_handler(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: RecipeRequest = parse_body(body)?;

    let ingredients = request.ingredients.trim().to_string();
    if ingredients.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "Ingredients cannot be empty".to_string(),
        ));
    }
    let use_fallback = request.use_fallback;

    let gate = state.generation_gate.clone();
    let pipeline = state.pipeline.clone();
    let work = async move {
        // The permit moves into the blocking task, so it is released only when generation
        // actually finishes, even if this request has already timed out.
        let permit = gate.lock_owned().await;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            pipeline.generate_recipe(&ingredients, use_fallback)
        })
        .await
    };

    let outcome = tokio::time::timeout(state.request_timeout, work)
        .await
        .map_err(|_| GatewayError::Timeout(state.request_timeout))?
        .map_err(|e| GatewayError::InternalError(format!("generation task failed: {}", e)))?;

    let source = outcome.source();
    let generated_by = source.generated_by(state.generator_tier());
    let recipe = outcome
        .into_result()
        .map_err(GatewayError::GenerationFailed)?;

    info!(generated_by, recipe_chars = recipe.chars().count(), "Recipe served");

    Ok(with_status(
        super::recipe_status(source),
        Json(RecipeResponse {
            recipe,
            generated_by: generated_by.to_string(),
        }),
    ))
}
