use crate::{
    entities::{
        cart_item,
        order::{self, OrderStatus},
        order_item,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::pricing::PricingService,
};
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Billing details supplied by the buyer at checkout.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BillingDetails {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2, max = 100))]
    pub country: String,
}

/// Converts cart contents into a pending order.
///
/// Price resolution happens up front; the order and all its lines are then
/// written in one transaction, so either everything is durably visible or
/// nothing is. The cart is left untouched here: it is only cleared once
/// payment is confirmed, so an abandoned checkout can simply be retried.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    pricing: Arc<PricingService>,
    event_sender: Arc<EventSender>,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        pricing: Arc<PricingService>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            pricing,
            event_sender,
        }
    }

    /// Creates a pending order from the given cart lines.
    ///
    /// The caller guarantees `items` is non-empty; an empty cart is rejected
    /// at the handler before this runs. Any price resolution failure aborts
    /// the whole operation before a single row is written.
    #[instrument(skip(self, items, billing), fields(user_id = %user_id, line_count = items.len()))]
    pub async fn create_order(
        &self,
        user_id: Uuid,
        items: &[cart_item::Model],
        billing: BillingDetails,
    ) -> Result<(order::Model, Decimal), ServiceError> {
        billing.validate()?;

        let mut prices: HashMap<Uuid, Decimal> = HashMap::new();
        for item in items {
            if !prices.contains_key(&item.course_id) {
                let price = self.pricing.price_of(item.course_id).await?;
                prices.insert(item.course_id, price);
            }
        }

        let total = compute_order_total(items, &prices);
        let order_number = generate_order_number();
        let order_id = Uuid::new_v4();
        let now = Utc::now();

        let txn = self.db.begin().await?;

        let order = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(user_id),
            first_name: Set(billing.first_name),
            last_name: Set(billing.last_name),
            email: Set(billing.email),
            country: Set(billing.country),
            total: Set(total),
            order_number: Set(order_number),
            status: Set(OrderStatus::Pending.to_string()),
            payment_reference: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let order = order.insert(&txn).await?;

        for item in items {
            let line = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                course_id: Set(item.course_id),
                unit_price: Set(prices[&item.course_id]),
                created_at: Set(now),
            };
            line.insert(&txn).await?;
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderCreated(order_id))
            .await;
        self.event_sender
            .send_or_log(Event::CheckoutCompleted { order_id, total })
            .await;

        info!(order_id = %order_id, total = %total, "Order created from cart");
        Ok((order, total))
    }
}

/// Sum of the resolved unit price for every cart line. Lines are not
/// deduplicated; a repeated course id contributes its price once per line.
fn compute_order_total(
    items: &[cart_item::Model],
    prices: &HashMap<Uuid, Decimal>,
) -> Decimal {
    items
        .iter()
        .map(|item| prices.get(&item.course_id).copied().unwrap_or(Decimal::ZERO))
        .sum()
}

/// Human-readable, time-derived order number. The random suffix keeps two
/// checkouts in the same second apart; the column's unique key backstops it.
fn generate_order_number() -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("ORD-{}-{:04}", Utc::now().format("%Y%m%d%H%M%S"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn cart_line(course_id: Uuid) -> cart_item::Model {
        let now = Utc::now();
        cart_item::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            course_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn total_sums_each_line() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let items = vec![cart_line(a), cart_line(b)];
        let prices = HashMap::from([(a, dec!(20.00)), (b, dec!(15.50))]);

        assert_eq!(compute_order_total(&items, &prices), dec!(35.50));
    }

    #[test]
    fn repeated_course_counts_per_line() {
        let a = Uuid::new_v4();
        let items = vec![cart_line(a), cart_line(a)];
        let prices = HashMap::from([(a, dec!(9.99))]);

        assert_eq!(compute_order_total(&items, &prices), dec!(19.98));
    }

    #[test]
    fn order_number_is_time_derived() {
        let number = generate_order_number();
        assert!(number.starts_with("ORD-"));
        // ORD- + 14-digit timestamp + - + 4-digit suffix
        assert_eq!(number.len(), 4 + 14 + 1 + 4);
    }

    proptest! {
        /// Decimal addition over arbitrary cent amounts never drifts: the
        /// total equals the sum computed in integer cents.
        #[test]
        fn total_matches_integer_cents(cents in proptest::collection::vec(0u64..1_000_000, 1..20)) {
            let mut items = Vec::new();
            let mut prices = HashMap::new();
            for &c in &cents {
                let id = Uuid::new_v4();
                items.push(cart_line(id));
                prices.insert(id, Decimal::new(c as i64, 2));
            }

            let expected = Decimal::new(cents.iter().sum::<u64>() as i64, 2);
            prop_assert_eq!(compute_order_total(&items, &prices), expected);
        }
    }
}
