pub mod auth;
pub mod cart;
pub mod checkout;
pub mod common;
pub mod courses;
pub mod enrollments;
pub mod payments;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services;
use crate::services::payments::PaymentGateway;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<services::UserService>,
    pub courses: Arc<services::CourseService>,
    pub pricing: Arc<services::PricingService>,
    pub cart: Arc<services::CartService>,
    pub checkout: Arc<services::CheckoutService>,
    pub orders: Arc<services::OrderService>,
    pub enrollments: Arc<services::EnrollmentService>,
    pub payments: Arc<services::PaymentService>,
}

impl AppServices {
    /// Wire up the full service graph over one connection pool. The payment
    /// gateway is injected so providers can be swapped (and stubbed in
    /// tests) without touching any orchestration.
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        auth_service: Arc<AuthService>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let users = Arc::new(services::UserService::new(
            db.clone(),
            auth_service,
            event_sender.clone(),
        ));
        let courses = Arc::new(services::CourseService::new(db.clone()));
        let pricing = Arc::new(services::PricingService::new(db.clone()));
        let cart = Arc::new(services::CartService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let checkout = Arc::new(services::CheckoutService::new(
            db.clone(),
            pricing.clone(),
            event_sender.clone(),
        ));
        let orders = Arc::new(services::OrderService::new(db.clone()));
        let enrollments = Arc::new(services::EnrollmentService::new(db.clone()));
        let payments = Arc::new(services::PaymentService::new(
            db,
            gateway,
            orders.clone(),
            enrollments.clone(),
            cart.clone(),
            event_sender,
        ));

        Self {
            users,
            courses,
            pricing,
            cart,
            checkout,
            orders,
            enrollments,
            payments,
        }
    }
}
