use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body, http::Request, http::StatusCode, response::IntoResponse};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::embedding::{NameEncoder, TextEmbedder};
use crate::gateway::error::GatewayError;
use crate::gateway::state::AppState;
use crate::gateway::{NAMECHEF_STATUS_HEADER, create_router_with_state};
use crate::generation::{MockGenerator, ModelTier};
use crate::matching::{HybridRanker, MatchError, NameCatalog};
use crate::recipe::{GuardedPipeline, KeywordFallback};

const GOOD_RECIPE: &str = "Chicken Rice Bowl\n\nIngredients:\n- 1 cup rice\n- 1 chicken breast\n\n\
     Instructions:\n1. Boil the rice.\n2. Heat oil and cook the chicken.\n3. Add soy sauce, mix and serve.";

fn test_state(generator: MockGenerator) -> AppState {
    let embedder: Arc<dyn TextEmbedder> = Arc::new(NameEncoder::stub().unwrap());
    let names = ["Gita", "Geetha", "Priya"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let catalog = Arc::new(NameCatalog::build(names, embedder.as_ref()).unwrap());
    let ranker = Arc::new(HybridRanker::new(catalog, embedder).unwrap());

    let pipeline = Arc::new(GuardedPipeline::new(
        Arc::new(generator),
        Arc::new(KeywordFallback::builtin()),
    ));

    AppState::new(ranker, pipeline)
}

fn test_router(generator: MockGenerator) -> Router {
    create_router_with_state(test_state(generator))
}

async fn post_json(router: &Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    router.clone().oneshot(request).await.unwrap()
}

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.clone().oneshot(request).await.unwrap()
}

fn status_header(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(NAMECHEF_STATUS_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

mod probe_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let router = test_router(MockGenerator::echo());
        let response = get(&router, "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(status_header(&response), "healthy");
        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"status": "healthy", "service": "api"}));
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let router = test_router(MockGenerator::echo());
        let json = body_json(get(&router, "/").await).await;

        assert_eq!(json["endpoints"]["match_names"], "/api/match-names");
        assert_eq!(json["endpoints"]["get_recipe"], "/api/get-recipe");
        assert_eq!(json["endpoints"]["health"], "/health");
    }

    #[tokio::test]
    async fn test_ready_reports_component_modes() {
        let router = test_router(MockGenerator::echo().with_tier(ModelTier::Base));
        let response = get(&router, "/ready").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(status_header(&response), "ready");
        let json = body_json(response).await;
        assert_eq!(json["components"]["catalog_size"], 3);
        assert_eq!(json["components"]["embedder_mode"], "stub");
        assert_eq!(json["components"]["generator_tier"], "base");
    }
}

mod match_names_tests {
    use super::*;

    #[tokio::test]
    async fn test_exact_name_is_best_match() {
        let router = test_router(MockGenerator::echo());
        let response = post_json(
            &router,
            "/api/match-names",
            serde_json::json!({"name": " Gita "}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(status_header(&response), "matched");

        let json = body_json(response).await;
        assert_eq!(json["input_name"], " Gita ");
        assert_eq!(json["best_match"]["name"], "Gita");
        assert_eq!(json["best_match"]["score"], 1.0);
        assert_eq!(json["all_matches"].as_array().unwrap().len(), 3);
        assert_eq!(json["all_matches"][0], json["best_match"]);
    }

    #[tokio::test]
    async fn test_top_k_limits_results() {
        let router = test_router(MockGenerator::echo());
        let response = post_json(
            &router,
            "/api/match-names",
            serde_json::json!({"name": "Priya", "top_k": 2}),
        )
        .await;

        let json = body_json(response).await;
        assert_eq!(json["all_matches"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let router = test_router(MockGenerator::echo());
        let response =
            post_json(&router, "/api/match-names", serde_json::json!({"name": "   "})).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(status_header(&response), "invalid_request");
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Name cannot be empty"));
        assert_eq!(json["code"], 400);
    }

    #[tokio::test]
    async fn test_zero_top_k_rejected() {
        let router = test_router(MockGenerator::echo());
        let response = post_json(
            &router,
            "/api/match-names",
            serde_json::json!({"name": "Gita", "top_k": 0}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_name_rejected() {
        let router = test_router(MockGenerator::echo());
        let response =
            post_json(&router, "/api/match-names", serde_json::json!({"nom": "Gita"})).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Invalid request schema"));
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let router = test_router(MockGenerator::echo());
        let request = Request::builder()
            .method("POST")
            .uri("/api/match-names")
            .header("Content-Type", "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

mod get_recipe_tests {
    use super::*;

    #[tokio::test]
    async fn test_generated_recipe() {
        let generator = MockGenerator::completing(GOOD_RECIPE);
        let router = test_router(generator.clone());
        let response = post_json(
            &router,
            "/api/get-recipe",
            serde_json::json!({"ingredients": "  chicken,rice "}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(status_header(&response), "generated");
        let json = body_json(response).await;
        assert_eq!(json["recipe"], GOOD_RECIPE);
        assert_eq!(json["generated_by"], "recipe-bot-lora");
        assert!(generator.prompts()[0].contains("chicken, rice [/INST]"));
    }

    #[tokio::test]
    async fn test_base_tier_label() {
        let router = test_router(MockGenerator::completing(GOOD_RECIPE).with_tier(ModelTier::Base));
        let response = post_json(
            &router,
            "/api/get-recipe",
            serde_json::json!({"ingredients": "chicken"}),
        )
        .await;

        let json = body_json(response).await;
        assert_eq!(json["generated_by"], "recipe-bot-base");
    }

    #[tokio::test]
    async fn test_failure_falls_back_by_default() {
        let router = test_router(MockGenerator::failing("CUDA out of memory"));
        let response = post_json(
            &router,
            "/api/get-recipe",
            serde_json::json!({"ingredients": "chicken, rice"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(status_header(&response), "fallback");
        let json = body_json(response).await;
        assert_eq!(json["generated_by"], "keyword-fallback");
        assert!(json["recipe"].as_str().unwrap().starts_with("Chicken Fried Rice"));
    }

    #[tokio::test]
    async fn test_failure_without_fallback_is_500() {
        let router = test_router(MockGenerator::failing("CUDA out of memory"));
        let response = post_json(
            &router,
            "/api/get-recipe",
            serde_json::json!({"ingredients": "chicken", "use_fallback": false}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_header(&response), "generation_error");
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("CUDA out of memory"));
    }

    #[tokio::test]
    async fn test_invalid_recipe_without_fallback_is_500() {
        let router = test_router(MockGenerator::echo());
        let response = post_json(
            &router,
            "/api/get-recipe",
            serde_json::json!({"ingredients": "chicken", "use_fallback": false}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .contains("Generated invalid recipe")
        );
    }

    #[tokio::test]
    async fn test_empty_ingredients_rejected() {
        let generator = MockGenerator::echo();
        let router = test_router(generator.clone());
        let response = post_json(
            &router,
            "/api/get-recipe",
            serde_json::json!({"ingredients": " "}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_504() {
        let generator = MockGenerator::completing(GOOD_RECIPE).with_delay(Duration::from_millis(500));
        let state = test_state(generator).with_request_timeout(Duration::from_millis(50));
        let router = create_router_with_state(state);

        let response = post_json(
            &router,
            "/api/get-recipe",
            serde_json::json!({"ingredients": "chicken"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(status_header(&response), "timeout");
    }

    #[tokio::test]
    async fn test_generation_is_serialised() {
        let generator = MockGenerator::completing(GOOD_RECIPE).with_delay(Duration::from_millis(150));
        let state = test_state(generator.clone());
        let gate = state.generation_gate.clone();
        let router = create_router_with_state(state);

        let first = post_json(
            &router,
            "/api/get-recipe",
            serde_json::json!({"ingredients": "chicken"}),
        );
        let second = post_json(
            &router,
            "/api/get-recipe",
            serde_json::json!({"ingredients": "rice"}),
        );
        let (a, b) = tokio::join!(first, second);

        assert_eq!(a.status(), StatusCode::OK);
        assert_eq!(b.status(), StatusCode::OK);
        assert_eq!(generator.call_count(), 2);
        assert!(gate.try_lock().is_ok());
    }
}

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_error_mapping() {
        let cases = [
            (
                GatewayError::InvalidRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                GatewayError::MatchFailed(MatchError::InvalidInput {
                    reason: "top_k".to_string(),
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                GatewayError::MatchFailed(MatchError::DimensionMismatch {
                    expected: 384,
                    actual: 2,
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                GatewayError::GenerationFailed("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                GatewayError::Timeout(Duration::from_secs(300)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                GatewayError::InternalError("join".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected);
            let json = body_json(response).await;
            assert_eq!(json["code"], expected.as_u16());
        }
    }

    #[test]
    fn test_timeout_message() {
        let err = GatewayError::Timeout(Duration::from_secs(300));
        assert_eq!(err.to_string(), "request timed out after 300s");
    }
}
