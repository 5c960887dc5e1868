//! AWS Lambda handler for solving annuities
//!
//! Accepts an annuity definition as a JSON body and returns the solved result,
//! including the amortization schedule unless `?schedule=false` is passed.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use annuity_solver::{parse_annuity, AnnuityEngine, EngineError, SolveResult, SolverConfig};
use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message }).to_string();
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(body))?)
}

fn json_response(body: &SolveResult) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

/// True unless the query string turns the schedule off
fn wants_schedule(event: &Request) -> bool {
    event
        .query_string_parameters_ref()
        .and_then(|params| params.first("schedule"))
        .map(|value| !value.eq_ignore_ascii_case("false"))
        .unwrap_or(true)
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)?);
    }

    let declared_empty = event
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false);
    if declared_empty {
        return error_response(400, &EngineError::EmptyInput.to_string());
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => String::new(),
    };

    let annuity = match parse_annuity(&body_str) {
        Ok(a) => a,
        Err(EngineError::EmptyInput) => {
            return error_response(400, &EngineError::EmptyInput.to_string());
        }
        Err(e) => {
            return error_response(400, &format!("Invalid JSON: {}", e));
        }
    };

    let engine = AnnuityEngine::new(SolverConfig::from_env());
    match engine.solve(&annuity, wants_schedule(&event)) {
        Ok(result) => json_response(&result),
        Err(e) => {
            log::warn!("Solve failed: {}", e);
            error_response(422, &e.to_string())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http;
    use std::collections::HashMap;

    const BULLET: &str = r#"{"Compounding":"Annual","Unknown":true,"CashFlows":[
        {"CfType":"Invest","First":"2023-01-01","Number":1,"Amount":1000,"Frequency":"Annual"},
        {"CfType":"Return","First":"2024-01-01","Number":1,"Amount":1100,"Frequency":"Annual"}]}"#;

    fn post(body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .body(Body::Text(body.to_string()))
            .unwrap()
    }

    fn body_text(response: &Response<Body>) -> String {
        match response.body() {
            Body::Text(s) => s.clone(),
            Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
            Body::Empty => String::new(),
        }
    }

    #[tokio::test]
    async fn test_preflight() {
        let request = http::Request::builder().method("OPTIONS").body(Body::Empty).unwrap();
        let response = handler(request).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert!(response.headers().contains_key("Access-Control-Allow-Methods"));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let response = handler(post("")).await.unwrap();
        assert_eq!(response.status().as_u16(), 400);
        assert!(body_text(&response).contains("Please send a request body"));

        let request = http::Request::builder()
            .method("POST")
            .header("content-length", "0")
            .body(Body::Empty)
            .unwrap();
        assert_eq!(handler(request).await.unwrap().status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_bad_json() {
        let response = handler(post("{\"CashFlows\": [")).await.unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_engine_error_is_unprocessable() {
        let body = BULLET.replace("1100", "5000");
        let response = handler(post(&body)).await.unwrap();
        assert_eq!(response.status().as_u16(), 422);
        assert!(body_text(&response).contains("interest rate out of range"));
    }

    #[tokio::test]
    async fn test_solve_with_and_without_schedule() {
        let response = handler(post(BULLET)).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let value: serde_json::Value = serde_json::from_str(&body_text(&response)).unwrap();
        assert!(value.get("AmSchedule").is_some());

        let params: HashMap<String, String> = [("schedule".to_string(), "false".to_string())].into();
        let request = post(BULLET).with_query_string_parameters(params);
        let response = handler(request).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&body_text(&response)).unwrap();
        assert!(value.get("AmSchedule").is_none());
        assert!((value["Solved"]["Effective"].as_f64().unwrap() - 0.10).abs() < 1e-6);
    }
}
