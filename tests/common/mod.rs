#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use coursestack_api::{
    auth::{roles, AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::{course, order, user},
    errors::ServiceError,
    events::{self, EventSender},
    handlers::AppServices,
    services::payments::{PaymentApproval, PaymentCapture, PaymentGateway},
    AppState,
};

/// Payment gateway stub: deterministic approval handles, no network.
/// Flip `fail_capture` to make the provider reject execution.
pub struct StubGateway {
    pub fail_capture: AtomicBool,
}

impl StubGateway {
    pub fn new() -> Self {
        Self {
            fail_capture: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn initiate(&self, order: &order::Model) -> Result<PaymentApproval, ServiceError> {
        Ok(PaymentApproval {
            payment_id: format!("PAY-{}", order.id.simple()),
            approval_url: format!(
                "https://provider.test/approve?order={}",
                order.order_number
            ),
        })
    }

    async fn capture(
        &self,
        payment_id: &str,
        _payer_id: &str,
    ) -> Result<PaymentCapture, ServiceError> {
        if self.fail_capture.load(Ordering::SeqCst) {
            return Err(ServiceError::ExternalServiceError(
                "payment execution failed with status 400 Bad Request".to_string(),
            ));
        }
        Ok(PaymentCapture {
            payment_id: payment_id.to_string(),
            state: "approved".to_string(),
        })
    }
}

/// Application harness over a throwaway SQLite database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub auth_service: Arc<AuthService>,
    pub gateway: Arc<StubGateway>,
    db_file: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_file = format!("coursestack_test_{}.db", Uuid::new_v4().simple());
        let _ = std::fs::remove_file(&db_file);

        let cfg = AppConfig::new(
            format!("sqlite://{db_file}?mode=rwc"),
            "test_secret_key_for_testing_purposes_only".to_string(),
            18_080,
            "test".to_string(),
        );

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(1024);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_service = Arc::new(AuthService::new(AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration),
        )));

        let gateway = Arc::new(StubGateway::new());

        let services = AppServices::new(
            db_arc.clone(),
            Arc::new(event_sender.clone()),
            auth_service.clone(),
            gateway.clone(),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", coursestack_api::api_v1_routes())
            .layer(axum::middleware::from_fn_with_state(
                auth_service.clone(),
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: axum::http::Request<Body>,
                 next: axum::middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ))
            .with_state(state.clone());

        Self {
            router,
            state,
            auth_service,
            gateway,
            db_file,
            _event_task: event_task,
        }
    }

    /// Insert a verified user and return it with a valid bearer token.
    pub async fn seed_user(&self, role: &str) -> (user::Model, String) {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let password_hash = self
            .auth_service
            .hash_password("correct-horse-battery")
            .expect("hash password");

        let model = user::ActiveModel {
            id: Set(id),
            first_name: Set("Test".to_string()),
            last_name: Set("User".to_string()),
            email: Set(format!("user-{}@example.com", id.simple())),
            password_hash: Set(password_hash),
            role: Set(role.to_string()),
            is_verified: Set(true),
            otp_code: Set(None),
            otp_expires_at: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed user");

        let token = self
            .auth_service
            .generate_token(&model)
            .expect("issue token");
        (model, token)
    }

    /// Insert a verified student and return it with a valid bearer token.
    pub async fn seed_student(&self) -> (user::Model, String) {
        self.seed_user(roles::STUDENT).await
    }

    /// Insert a catalog entry priced as given.
    pub async fn seed_course(&self, title: &str, price: Decimal) -> course::Model {
        let now = Utc::now();
        course::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            description: Set(None),
            price: Set(price),
            teacher_id: Set(Uuid::new_v4()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed course")
    }

    /// Issue a request against the router, optionally authenticated.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_file);
    }
}

/// Parse a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
