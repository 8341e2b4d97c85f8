use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CourseStack API",
        version = "0.1.0",
        description = "Course marketplace backend: catalog, cart, checkout, PayPal payments and enrollments."
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::verify_otp,
        crate::handlers::auth::login,
        // Courses
        crate::handlers::courses::create_course,
        crate::handlers::courses::list_courses,
        crate::handlers::courses::get_course,
        // Cart
        crate::handlers::cart::get_cart,
        crate::handlers::cart::add_to_cart,
        crate::handlers::cart::remove_from_cart,
        // Checkout
        crate::handlers::checkout::create_order_from_cart,
        // Payments
        crate::handlers::payments::create_paypal_payment,
        crate::handlers::payments::paypal_success,
        crate::handlers::payments::paypal_cancel,
        // Enrollments
        crate::handlers::enrollments::list_enrollments,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::handlers::auth::RegisterRequest,
        crate::handlers::auth::VerifyOtpRequest,
        crate::handlers::auth::LoginRequest,
        crate::handlers::auth::TokenResponse,
        crate::handlers::auth::RegisteredResponse,
        crate::handlers::courses::CreateCourseRequest,
        crate::handlers::courses::CourseResponse,
        crate::handlers::cart::AddToCartRequest,
        crate::handlers::cart::CartItemResponse,
        crate::handlers::checkout::CheckoutRequest,
        crate::handlers::checkout::CheckoutResponse,
        crate::handlers::enrollments::EnrollmentResponse,
        crate::services::payments::PaymentApproval,
        crate::services::payments::PaymentConfirmation,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, verification and login"),
        (name = "Courses", description = "Catalog"),
        (name = "Cart", description = "Pending purchase selections"),
        (name = "Checkout", description = "Cart to order conversion"),
        (name = "Payments", description = "Provider approval and capture"),
        (name = "Enrollments", description = "Course access records"),
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
