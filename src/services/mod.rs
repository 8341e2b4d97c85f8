pub mod cart;
pub mod checkout;
pub mod courses;
pub mod enrollment;
pub mod orders;
pub mod payments;
pub mod paypal;
pub mod pricing;
pub mod users;

pub use cart::CartService;
pub use checkout::CheckoutService;
pub use courses::CourseService;
pub use enrollment::EnrollmentService;
pub use orders::OrderService;
pub use payments::{PaymentGateway, PaymentService};
pub use paypal::PayPalGateway;
pub use pricing::PricingService;
pub use users::UserService;
