use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use contact_validation::ContactInput;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub mod error;
pub mod rate_limit;
pub mod repository;
pub mod response;
pub mod telemetry;
pub mod timing;
pub mod validation;

use error::ApiError;
use rate_limit::{rate_limit_middleware, RateLimiter};
use repository::{Contact, ContactRepository};
use response::{RequestMeta, SuccessResponse};
use timing::response_timing;
use validation::{payload_limit_config, process_contact_input};

pub const SERVICE_NAME: &str = "contact-api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service_name: String,
    pub uptime_seconds: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Contact API state and routes
pub struct ContactApi {
    repository: Arc<dyn ContactRepository>,
    rate_limiter: Arc<RateLimiter>,
    started_at: Instant,
}

impl ContactApi {
    pub fn new(repository: Arc<dyn ContactRepository>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            repository,
            rate_limiter,
            started_at: Instant::now(),
        }
    }

    /// Create the Axum router with all routes and middleware
    pub fn create_router(self: Arc<Self>) -> Router {
        let contacts = Router::new()
            .route("/", post(Self::create_contact_handler).get(Self::list_contacts_handler))
            .route(
                "/:id",
                get(Self::get_contact_handler).delete(Self::delete_contact_handler),
            )
            .layer(middleware::from_fn(process_contact_input));

        Router::new()
            .route("/", get(Self::root_handler))
            .route("/health", get(Self::health_handler))
            .route("/api/v1/rate-limit", get(Self::rate_limit_stats_handler))
            .nest("/api/v1/contatos", contacts)
            .fallback(Self::not_found_handler)
            .layer(payload_limit_config())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PUT,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(response_timing))
            .layer(middleware::from_fn_with_state(
                Arc::clone(&self.rate_limiter),
                rate_limit_middleware,
            ))
            .with_state(self)
    }

    /// Normalize `input` and store it
    pub async fn create_contact(&self, input: ContactInput) -> Result<Contact, ApiError> {
        let normalized = input.sanitize_and_validate()?;
        let contact = self.repository.create(Contact::new(normalized)).await?;
        tracing::info!(contact_id = %contact.id, "Contact created");
        Ok(contact)
    }

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        Ok(self.repository.list().await?)
    }

    pub async fn get_contact(&self, id: &str) -> Result<Contact, ApiError> {
        Ok(self.repository.get(parse_id(id)?).await?)
    }

    pub async fn delete_contact(&self, id: &str) -> Result<(), ApiError> {
        let id = parse_id(id)?;
        self.repository.delete(id).await?;
        tracing::info!(contact_id = %id, "Contact deleted");
        Ok(())
    }

    async fn root_handler() -> impl IntoResponse {
        Json(serde_json::json!({
            "service": "Contact API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": [
                "GET /health",
                "GET /api/v1/rate-limit",
                "POST /api/v1/contatos",
                "GET /api/v1/contatos",
                "GET /api/v1/contatos/:id",
                "DELETE /api/v1/contatos/:id"
            ]
        }))
    }

    async fn health_handler(State(api): State<Arc<Self>>) -> impl IntoResponse {
        Json(HealthResponse {
            status: "ok".to_string(),
            service_name: SERVICE_NAME.to_string(),
            uptime_seconds: api.started_at.elapsed().as_secs(),
            timestamp: chrono::Utc::now(),
        })
    }

    async fn rate_limit_stats_handler(State(api): State<Arc<Self>>) -> impl IntoResponse {
        let stats = api.rate_limiter.store().stats().await;
        Json(SuccessResponse::data(stats))
    }

    async fn create_contact_handler(
        State(api): State<Arc<Self>>,
        meta: RequestMeta,
        payload: Result<Json<ContactInput>, JsonRejection>,
    ) -> Response {
        let result = match payload {
            Ok(Json(input)) => api.create_contact(input).await,
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected contact payload");
                Err(ApiError::BadRequest("Invalid data format".to_string()))
            }
        };

        match result {
            Ok(contact) => (
                StatusCode::CREATED,
                Json(SuccessResponse::data(contact).with_message("Contact created successfully")),
            )
                .into_response(),
            Err(err) => err.respond(&meta),
        }
    }

    async fn list_contacts_handler(State(api): State<Arc<Self>>, meta: RequestMeta) -> Response {
        match api.list_contacts().await {
            Ok(contacts) => {
                let total = contacts.len();
                Json(SuccessResponse::data(contacts).with_total(total)).into_response()
            }
            Err(err) => err.respond(&meta),
        }
    }

    async fn get_contact_handler(
        State(api): State<Arc<Self>>,
        meta: RequestMeta,
        Path(id): Path<String>,
    ) -> Response {
        match api.get_contact(&id).await {
            Ok(contact) => Json(SuccessResponse::data(contact)).into_response(),
            Err(err) => err.respond(&meta),
        }
    }

    async fn delete_contact_handler(
        State(api): State<Arc<Self>>,
        meta: RequestMeta,
        Path(id): Path<String>,
    ) -> Response {
        match api.delete_contact(&id).await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(err) => err.respond(&meta),
        }
    }

    async fn not_found_handler(meta: RequestMeta) -> Response {
        ApiError::NotFound("Route not found".to_string()).respond(&meta)
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid contact ID".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::{RateLimitConfig, RateLimitStore};
    use crate::repository::InMemoryContactRepository;

    fn api() -> ContactApi {
        let store = Arc::new(RateLimitStore::new());
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::api(), store));
        ContactApi::new(Arc::new(InMemoryContactRepository::new()), limiter)
    }

    fn input() -> ContactInput {
        ContactInput {
            nome: Some("  Maria da Silva ".to_string()),
            email: Some("Maria@Example.com".to_string()),
            cpf_cnpj: Some("11144477735".to_string()),
            telefone: Some("11987654321".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_contact_stores_canonical_values() {
        let api = api();
        let contact = api.create_contact(input()).await.unwrap();

        assert_eq!(contact.nome, "Maria da Silva");
        assert_eq!(contact.email, "maria@example.com");
        assert_eq!(contact.cpf_cnpj, "111.444.777-35");
        assert_eq!(contact.telefone, "(11) 98765-4321");
        assert_eq!(api.get_contact(&contact.id.to_string()).await.unwrap(), contact);
    }

    #[tokio::test]
    async fn test_duplicate_document_conflicts() {
        let api = api();
        api.create_contact(input()).await.unwrap();

        let mut again = input();
        again.email = Some("outra@example.com".to_string());
        again.cpf_cnpj = Some("111.444.777-35".to_string());
        assert!(matches!(
            api.create_contact(again).await,
            Err(ApiError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_id_is_bad_request() {
        let api = api();
        assert!(matches!(
            api.get_contact("not-a-uuid").await,
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            api.delete_contact(&Uuid::new_v4().to_string()).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
