//! Oracle Lambda - Handles /v1/oracle endpoint.
//!
//! Resolves a free-text monument query into a profile via the Gemini API.
//!
//! Endpoints:
//! - POST /v1/oracle - Resolve a monument profile

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{error_response, error_to_response, json_response, NOT_FOUND_MESSAGE};
use shared::{ApiResponse, Config, GeminiClient, OracleRequest, ProfileResolver};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    resolver: ProfileResolver<GeminiClient>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::load().await?;

        Ok(Self {
            resolver: ProfileResolver::from_config(&config)?,
        })
    }
}

/// Where a request goes, decided from its method and path alone.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    Resolve,
    MethodNotAllowed,
    NotFound,
}

fn route(method: &str, path: &str) -> Route {
    match (method, path.trim_end_matches('/')) {
        ("POST", "/v1/oracle") => Route::Resolve,
        (_, "/v1/oracle") => Route::MethodNotAllowed,
        _ => Route::NotFound,
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!("Oracle request: {} {}", method, path);

    match route(method, path) {
        Route::Resolve => {
            let request: OracleRequest = shared::parse_body!(event.body());

            let query = match request.validated_query() {
                Ok(query) => query,
                Err(e) => return error_to_response(&e),
            };

            match state.resolver.resolve(query).await {
                Ok(Some(profile)) => json_response(200, &ApiResponse::success(profile)),
                Ok(None) => {
                    info!(query = %query, "no profile found");
                    error_response(404, NOT_FOUND_MESSAGE)
                }
                Err(e) => {
                    error!(query = %query, error = %e, "profile resolution failed");
                    error_to_response(&e)
                }
            }
        }

        Route::MethodNotAllowed => error_response(405, "Method not allowed"),

        Route::NotFound => error_response(404, "Not found"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_oracle() {
        assert_eq!(route("POST", "/v1/oracle"), Route::Resolve);
        assert_eq!(route("POST", "/v1/oracle/"), Route::Resolve);
    }

    #[test]
    fn test_route_wrong_method() {
        assert_eq!(route("GET", "/v1/oracle"), Route::MethodNotAllowed);
        assert_eq!(route("DELETE", "/v1/oracle/"), Route::MethodNotAllowed);
    }

    #[test]
    fn test_route_unknown_path() {
        assert_eq!(route("POST", "/v1/profiles"), Route::NotFound);
        assert_eq!(route("POST", "/"), Route::NotFound);
        assert_eq!(route("GET", "/v1/oracle/extra"), Route::NotFound);
    }
}
