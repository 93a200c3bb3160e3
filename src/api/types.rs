//! Request and response bodies for the API.

use serde::{Deserialize, Serialize};

use crate::cost::assumptions::{CostAssumptionSet, CostScenario};

/// One cost scenario and the years it tabulates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInfo {
    pub name: CostScenario,
    pub years: Vec<u32>,
}

/// `GET /scenarios` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenariosResponse {
    /// Cost scenarios available in the loaded table.
    pub cost_scenarios: Vec<ScenarioInfo>,
    /// Built-in scenario presets usable from the CLI.
    pub presets: Vec<&'static str>,
}

/// Query for `GET /cost-assumptions`.
#[derive(Debug, Deserialize)]
pub struct CostQuery {
    /// Scenario name; `base` when absent.
    pub scenario: Option<String>,
    /// Commissioning year; the earliest tabulated year when absent.
    pub year: Option<u32>,
}

/// `GET /cost-assumptions` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAssumptionsResponse {
    pub scenario: CostScenario,
    /// Year asked for, if any.
    pub requested_year: Option<u32>,
    /// Nearest tabulated year actually used.
    pub year: u32,
    pub assumptions: CostAssumptionSet,
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::assumptions::CostTable;

    #[test]
    fn cost_response_uses_camel_case() {
        let table = CostTable::builtin();
        let body = table
            .lookup(CostScenario::Optimistic, 2030)
            .map(|(year, set)| CostAssumptionsResponse {
                scenario: CostScenario::Optimistic,
                requested_year: Some(2031),
                year,
                assumptions: set.clone(),
            })
            .expect("optimistic 2031 should resolve");
        let json = serde_json::to_value(&body).expect("serialize response");
        assert_eq!(json["scenario"], "optimistic");
        assert_eq!(json["requestedYear"], 2031);
        assert!(json["assumptions"].get("solarCapexPerKw").is_some());
    }
}
