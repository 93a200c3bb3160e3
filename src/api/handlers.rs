//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use tracing::{error, info};

use super::AppState;
use super::types::{
    CostAssumptionsResponse, CostQuery, ErrorResponse, HealthResponse, ScenarioInfo,
    ScenariosResponse,
};
use crate::config::ScenarioConfig;
use crate::cost::assumptions::CostScenario;
use crate::error::SizingError;
use crate::optimize::{OptimizeParams, optimize_with};
use crate::optimizer::control::RunControl;
use crate::result::OptimizationResult;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn from_sizing(e: &SizingError) -> ApiError {
    let status = match e {
        SizingError::MissingCostData(_) => StatusCode::NOT_FOUND,
        SizingError::Backend(_) | SizingError::Cancelled { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Runs one optimisation on the blocking pool.
///
/// `POST /optimize` → 200 + `OptimizationResult` JSON
/// Malformed body or contract violation → 400 + `ErrorResponse`
pub async fn post_optimize(
    State(state): State<Arc<AppState>>,
    body: Result<Json<OptimizeParams>, JsonRejection>,
) -> Result<Json<OptimizationResult>, ApiError> {
    let Json(params) = body.map_err(|e| bad_request(e.body_text()))?;
    params.validate().map_err(|e| from_sizing(&e))?;

    let worker = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || {
        optimize_with(&params, &worker.search, &worker.table, &RunControl::default())
    })
    .await
    .map_err(|e| {
        error!(error = %e, "optimisation task failed");
        from_sizing(&SizingError::Backend(e.to_string()))
    })?;

    let result = outcome.map_err(|e| from_sizing(&e))?;
    info!(status = %result.solver_status, lcoe = result.net_lcoe_usd_per_mwh, "served /optimize");
    Ok(Json(result))
}

/// Lists cost scenarios with their tabulated years, and the built-in presets.
///
/// `GET /scenarios` → 200 + `ScenariosResponse` JSON
pub async fn get_scenarios(State(state): State<Arc<AppState>>) -> Json<ScenariosResponse> {
    let cost_scenarios = state
        .table
        .scenarios()
        .into_iter()
        .map(|name| ScenarioInfo {
            name,
            years: state.table.years(name),
        })
        .collect();
    Json(ScenariosResponse {
        cost_scenarios,
        presets: ScenarioConfig::PRESETS.to_vec(),
    })
}

/// Returns the assumption set a request would use.
///
/// `GET /cost-assumptions?scenario=base&year=2028` → 200, resolved to 2027
/// Unknown scenario → 400; scenario absent from the table → 404
pub async fn get_cost_assumptions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CostQuery>, QueryRejection>,
) -> Result<Json<CostAssumptionsResponse>, ApiError> {
    let Query(query) = query.map_err(|e| bad_request(e.body_text()))?;
    let scenario = match query.scenario.as_deref() {
        Some(name) => name.parse::<CostScenario>().map_err(|e| from_sizing(&e))?,
        None => CostScenario::Base,
    };
    let year = query
        .year
        .or_else(|| state.table.years(scenario).first().copied())
        .unwrap_or_default();
    let (resolved, set) = state
        .table
        .lookup(scenario, year)
        .map_err(|e| from_sizing(&e))?;

    Ok(Json(CostAssumptionsResponse {
        scenario,
        requested_year: query.year,
        year: resolved,
        assumptions: set.clone(),
    }))
}

/// Liveness probe.
///
/// `GET /health` → 200 + `{"status":"ok","version":...}`
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::cost::assumptions::CostTable;
    use crate::optimizer::grid::{GridSearch, SearchGrid};

    fn make_test_state() -> Arc<AppState> {
        let search = GridSearch::new(SearchGrid {
            solar_multiples: vec![1.0, 3.0],
            durations_hours: vec![0.0, 4.0],
            power_ratios: vec![1.0],
            ..SearchGrid::default()
        });
        Arc::new(AppState::new(Arc::new(CostTable::builtin())).with_search(search))
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&body).expect("body should be JSON")
    }

    async fn send(req: Request<Body>) -> Response {
        router(make_test_state())
            .oneshot(req)
            .await
            .unwrap_or_else(|e| match e {})
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let resp = send(get("/health")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn scenarios_lists_table() {
        let resp = send(get("/scenarios")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let scenarios = json["costScenarios"]
            .as_array()
            .cloned()
            .expect("costScenarios array");
        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[0]["name"], "base");
        assert!(json["presets"].as_array().is_some_and(|p| p.len() == 3));
    }

    #[tokio::test]
    async fn cost_assumptions_resolve_nearest_year() {
        let resp = send(get("/cost-assumptions?scenario=base&year=2028")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["year"], 2027);
        assert_eq!(json["requestedYear"], 2028);
    }

    #[tokio::test]
    async fn cost_assumptions_unknown_scenario_returns_400() {
        let resp = send(get("/cost-assumptions?scenario=aggressive")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await.get("error").is_some());
    }

    #[tokio::test]
    async fn optimize_returns_result() {
        let resp = send(post_json(
            "/optimize",
            r#"{"targetLoadMw": 50, "latitude": 35, "maxGasBackupFraction": 0.1,
                "commissioningYear": 2030, "costScenario": "optimistic"}"#,
        ))
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["candidatesEvaluated"], 4);
        assert_eq!(
            json["representativeDispatch"].as_array().map(Vec::len),
            Some(24)
        );
        assert!(json["solverStatus"].is_string());
    }

    #[tokio::test]
    async fn optimize_validation_error_returns_400() {
        let resp = send(post_json(
            "/optimize",
            r#"{"targetLoadMw": 50, "latitude": 135, "maxGasBackupFraction": 0.1,
                "commissioningYear": 2030}"#,
        ))
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().is_some_and(|e| e.contains("latitude")));
    }

    #[tokio::test]
    async fn optimize_malformed_body_returns_400() {
        let resp = send(post_json("/optimize", r#"{"targetLoadMw": "#)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await.get("error").is_some());
    }
}
