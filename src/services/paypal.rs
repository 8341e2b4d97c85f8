use crate::{
    config::AppConfig,
    entities::order,
    errors::ServiceError,
    services::payments::{PaymentApproval, PaymentCapture, PaymentGateway},
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Service-level PayPal REST credentials and endpoints.
#[derive(Debug, Clone)]
pub struct PayPalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub return_url: String,
    pub cancel_url: String,
    pub currency: String,
}

impl PayPalConfig {
    pub fn from_app_config(cfg: &AppConfig) -> Self {
        Self {
            client_id: cfg.paypal_client_id.clone(),
            client_secret: cfg.paypal_client_secret.clone(),
            base_url: cfg.paypal_base_url.trim_end_matches('/').to_string(),
            return_url: cfg.paypal_return_url.clone(),
            cancel_url: cfg.paypal_cancel_url.clone(),
            currency: cfg.currency.clone(),
        }
    }
}

// Wire types for PayPal's classic payments API. The `links` array with
// rel-tagged entries is the provider's published contract.

#[derive(Debug, Serialize)]
struct CreatePaymentBody {
    intent: &'static str,
    payer: Payer,
    transactions: Vec<Transaction>,
    redirect_urls: RedirectUrls,
}

#[derive(Debug, Serialize)]
struct Payer {
    payment_method: &'static str,
}

#[derive(Debug, Serialize)]
struct Transaction {
    amount: Amount,
    description: String,
}

#[derive(Debug, Serialize)]
struct Amount {
    total: String,
    currency: String,
}

#[derive(Debug, Serialize)]
struct RedirectUrls {
    return_url: String,
    cancel_url: String,
}

#[derive(Debug, Serialize)]
struct ExecutePaymentBody {
    payer_id: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResource {
    id: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    links: Vec<PaymentLink>,
}

#[derive(Debug, Deserialize)]
struct PaymentLink {
    rel: String,
    href: String,
}

/// PayPal implementation of the payment gateway capability. Talks to the
/// provider with service credentials over HTTPS; persists nothing locally.
pub struct PayPalGateway {
    config: PayPalConfig,
    http: reqwest::Client,
}

impl PayPalGateway {
    pub fn new(config: PayPalConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn initiate(&self, order: &order::Model) -> Result<PaymentApproval, ServiceError> {
        let body = CreatePaymentBody {
            intent: "sale",
            payer: Payer {
                payment_method: "paypal",
            },
            transactions: vec![Transaction {
                amount: Amount {
                    total: format_amount(order.total),
                    currency: self.config.currency.clone(),
                },
                description: format!("Order {}", order.order_number),
            }],
            redirect_urls: RedirectUrls {
                return_url: self.config.return_url.clone(),
                cancel_url: self.config.cancel_url.clone(),
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/payments/payment", self.config.base_url))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ServiceError::ExternalServiceError(format!("payment provider unreachable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            debug!(status = %status, detail = %detail, "Provider rejected payment creation");
            return Err(ServiceError::ExternalServiceError(format!(
                "payment creation failed with status {}",
                status
            )));
        }

        let payment: PaymentResource = response.json().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("malformed provider response: {}", e))
        })?;

        let approval_url = approval_link(&payment.links).ok_or_else(|| {
            ServiceError::ExternalServiceError("approval URL not found in provider response".to_string())
        })?;

        Ok(PaymentApproval {
            payment_id: payment.id,
            approval_url: approval_url.to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn capture(
        &self,
        payment_id: &str,
        payer_id: &str,
    ) -> Result<PaymentCapture, ServiceError> {
        let response = self
            .http
            .post(format!(
                "{}/v1/payments/payment/{}/execute",
                self.config.base_url, payment_id
            ))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .json(&ExecutePaymentBody {
                payer_id: payer_id.to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                ServiceError::ExternalServiceError(format!("payment provider unreachable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            debug!(status = %status, detail = %detail, "Provider rejected payment execution");
            return Err(ServiceError::ExternalServiceError(format!(
                "payment execution failed with status {}",
                status
            )));
        }

        let payment: PaymentResource = response.json().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("malformed provider response: {}", e))
        })?;

        Ok(PaymentCapture {
            payment_id: payment.id,
            state: payment.state.unwrap_or_else(|| "approved".to_string()),
        })
    }
}

/// Scans the provider's rel-tagged link list for the payer-facing approval
/// entry.
fn approval_link(links: &[PaymentLink]) -> Option<&str> {
    links
        .iter()
        .find(|link| link.rel == "approval_url")
        .map(|link| link.href.as_str())
}

/// Two-decimal amount string, as the provider's amount schema requires.
fn format_amount(total: Decimal) -> String {
    format!("{:.2}", total)
}
