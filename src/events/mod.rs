use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted after state transitions commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderCreated(Uuid),
    OrderCompleted(Uuid),
    CheckoutCompleted {
        order_id: Uuid,
        total: Decimal,
    },

    // Payment events
    PaymentInitiated {
        order_id: Uuid,
        payment_id: String,
    },
    PaymentCaptured {
        order_id: Uuid,
        payment_id: String,
    },
    PaymentFailed {
        payment_id: String,
        reason: String,
    },

    // Cart events
    CartItemAdded {
        user_id: Uuid,
        course_id: Uuid,
    },
    CartItemRemoved {
        user_id: Uuid,
        course_id: Uuid,
    },
    CartCleared(Uuid),

    // Enrollment events
    EnrollmentCreated {
        student_id: Uuid,
        course_id: Uuid,
    },

    // Account events
    UserRegistered(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing channel failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event; a full or closed channel is logged and otherwise
    /// ignored. Event delivery never fails a request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

/// Consumes the event stream for the life of the process. Events are
/// currently logged; downstream consumers hook in here.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderCreated(order_id) => {
                info!(order_id = %order_id, "event: order created");
            }
            Event::OrderCompleted(order_id) => {
                info!(order_id = %order_id, "event: order completed");
            }
            Event::CheckoutCompleted { order_id, total } => {
                info!(order_id = %order_id, total = %total, "event: checkout completed");
            }
            Event::PaymentInitiated {
                order_id,
                payment_id,
            } => {
                info!(order_id = %order_id, payment_id = %payment_id, "event: payment initiated");
            }
            Event::PaymentCaptured {
                order_id,
                payment_id,
            } => {
                info!(order_id = %order_id, payment_id = %payment_id, "event: payment captured");
            }
            Event::PaymentFailed { payment_id, reason } => {
                warn!(payment_id = %payment_id, reason = %reason, "event: payment failed");
            }
            _ => {
                info!(event = ?event, "event");
            }
        }
    }
    info!("Event processor stopped");
}
