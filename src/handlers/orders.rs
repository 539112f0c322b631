use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{OpenApi, ToSchema};

use crate::application::order_service::OrderService;
use crate::domain::errors::DomainError;
use crate::domain::order::{Amount, LineItem, OrderSubmission};
use crate::errors::{json_response, AppError, ErrorResponse};

pub const ORDER_ACCEPTED_MESSAGE: &str = "Order sent successfully";

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Upper bound on a POST body; larger bodies are rejected as a 500.
pub const MAX_ORDER_BODY_BYTES: usize = 1024 * 1024;

/// Order submitted by the storefront.
///
/// Every field is kept as raw JSON until the contact fields have been
/// checked, so a request missing one of them is rejected with 400 whatever
/// the rest of the body looks like. Absent and `null` read as empty.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[schema(value_type = Option<String>)]
    pub customer_name: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub customer_email: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub customer_phone: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub comment: Option<Value>,
    /// Each item is `{name, quantity, price, total}`.
    #[schema(value_type = Option<Vec<Object>>)]
    pub items: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub total_amount: Option<Value>,
}

impl OrderRequest {
    pub fn into_submission(self) -> Result<OrderSubmission, DomainError> {
        let contact = [
            &self.customer_name,
            &self.customer_email,
            &self.customer_phone,
        ];
        if contact.into_iter().any(is_blank) {
            return Err(DomainError::MissingRequiredFields);
        }

        let name = decode_field::<String>("customerName", self.customer_name)?;
        let email = decode_field::<String>("customerEmail", self.customer_email)?;
        let phone = decode_field::<String>("customerPhone", self.customer_phone)?;
        let comment = decode_field::<String>("comment", self.comment)?;
        let items = decode_field::<Vec<LineItem>>("items", self.items)?;
        let total_amount = decode_field::<Amount>("totalAmount", self.total_amount)?;

        OrderSubmission::new(
            name.unwrap_or_default(),
            email.unwrap_or_default(),
            phone.unwrap_or_default(),
            comment.unwrap_or_default(),
            items.unwrap_or_default(),
            total_amount.unwrap_or_default(),
        )
    }
}

fn is_blank(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// `null` decodes as absent.
fn decode_field<T: DeserializeOwned>(
    name: &str,
    value: Option<Value>,
) -> Result<Option<T>, DomainError> {
    value
        .filter(|v| !v.is_null())
        .map(serde_json::from_value::<T>)
        .transpose()
        .map_err(|e| DomainError::MalformedRequest(format!("{name}: {e}")))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderAcceptedResponse {
    pub message: String,
    #[serde(rename = "orderId")]
    pub order_id: String,
}

/// Decode a POST body. An empty body counts as `{}`.
pub fn parse_order_request(body: &[u8]) -> Result<OrderRequest, DomainError> {
    if body.is_empty() {
        return Ok(OrderRequest::default());
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| DomainError::MalformedRequest(e.to_string()))?;
    if !value.is_object() {
        return Err(DomainError::MalformedRequest(
            "request body must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| DomainError::MalformedRequest(e.to_string()))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /
///
/// Validates the order, mails it to the administrator (unless SMTP
/// credentials are absent) and answers with a generated order id. Every
/// failure other than a missing contact field is reported as a 500 carrying
/// the underlying message.
#[utoipa::path(
    post,
    path = "/",
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Order accepted", body = OrderAcceptedResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 500, description = "Malformed body or mail delivery failure", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn submit_order(
    service: web::Data<OrderService>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let body = body.map_err(|e| log_rejection(DomainError::MalformedRequest(e.to_string())))?;
    let order = parse_order_request(&body)
        .and_then(OrderRequest::into_submission)
        .map_err(log_rejection)?;

    let receipt = service.submit(order).await.map_err(log_rejection)?;

    Ok(json_response(
        StatusCode::OK,
        &OrderAcceptedResponse {
            message: ORDER_ACCEPTED_MESSAGE.to_string(),
            order_id: receipt.order_id.to_string(),
        },
    ))
}

fn log_rejection(e: DomainError) -> AppError {
    match &e {
        DomainError::MissingRequiredFields => log::warn!("Rejected order: {}", e),
        _ => log::error!("Order submission failed: {}", e),
    }
    e.into()
}

/// OPTIONS /
///
/// CORS preflight. The request itself is never inspected.
#[utoipa::path(
    options,
    path = "/",
    responses((status = 200, description = "Preflight accepted")),
    tag = "orders"
)]
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .finish()
}

/// Any other method on `/`.
pub async fn method_not_allowed() -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed)
}

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(crate::ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_reads_as_empty_object() {
        let request = parse_order_request(b"").unwrap();
        assert!(request.customer_name.is_none());
        assert!(matches!(
            request.into_submission(),
            Err(DomainError::MissingRequiredFields)
        ));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_order_request(b"name=Ivan").unwrap_err();
        match err {
            DomainError::MalformedRequest(msg) => assert!(!msg.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn json_array_body_is_malformed() {
        assert!(matches!(
            parse_order_request(b"[\"Ivan\", \"ivan@x.ru\", \"+7900\"]"),
            Err(DomainError::MalformedRequest(_))
        ));
    }

    #[test]
    fn null_contact_field_counts_as_missing() {
        let body = json!({
            "customerName": "Ivan",
            "customerEmail": null,
            "customerPhone": "+7900"
        });
        let request = parse_order_request(body.to_string().as_bytes()).unwrap();
        assert!(matches!(
            request.into_submission(),
            Err(DomainError::MissingRequiredFields)
        ));
    }

    #[test]
    fn missing_contact_wins_over_broken_items() {
        let body = json!({
            "customerName": "Ivan",
            "customerPhone": "+7900",
            "items": [{ "name": "Magnet" }]
        });
        let request = parse_order_request(body.to_string().as_bytes()).unwrap();
        assert!(matches!(
            request.into_submission(),
            Err(DomainError::MissingRequiredFields)
        ));
    }

    #[test]
    fn missing_contact_wins_over_mistyped_fields() {
        let body = json!({
            "customerName": 5,
            "customerPhone": "+7900",
            "comment": 5,
            "items": {},
            "totalAmount": "300"
        });
        let request = parse_order_request(body.to_string().as_bytes()).unwrap();
        assert!(matches!(
            request.into_submission(),
            Err(DomainError::MissingRequiredFields)
        ));
    }

    #[test]
    fn mistyped_field_is_malformed_once_contact_is_present() {
        let body = json!({
            "customerName": "Ivan",
            "customerEmail": "ivan@x.ru",
            "customerPhone": "+7900",
            "totalAmount": "300"
        });
        let request = parse_order_request(body.to_string().as_bytes()).unwrap();
        match request.into_submission() {
            Err(DomainError::MalformedRequest(msg)) => assert!(msg.starts_with("totalAmount: ")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn null_optional_fields_take_defaults() {
        let body = json!({
            "customerName": "Ivan",
            "customerEmail": "ivan@x.ru",
            "customerPhone": "+7900",
            "comment": null,
            "items": null,
            "totalAmount": null
        });
        let order = parse_order_request(body.to_string().as_bytes())
            .unwrap()
            .into_submission()
            .unwrap();
        assert_eq!(order.comment(), "");
        assert!(order.items().is_empty());
        assert_eq!(order.total_amount().grouped(), "0");
    }

    #[test]
    fn incomplete_item_is_malformed() {
        let body = json!({
            "customerName": "Ivan",
            "customerEmail": "ivan@x.ru",
            "customerPhone": "+7900",
            "items": [{ "name": "Magnet", "quantity": 2 }]
        });
        let request = parse_order_request(body.to_string().as_bytes()).unwrap();
        match request.into_submission() {
            Err(DomainError::MalformedRequest(msg)) => assert!(msg.contains("price")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn optional_fields_take_defaults() {
        let body = json!({
            "customerName": "Ivan",
            "customerEmail": "ivan@x.ru",
            "customerPhone": "+7900"
        });
        let order = parse_order_request(body.to_string().as_bytes())
            .unwrap()
            .into_submission()
            .unwrap();
        assert_eq!(order.comment(), "");
        assert!(order.items().is_empty());
        assert_eq!(order.total_amount().grouped(), "0");
    }

    #[test]
    fn items_keep_caller_totals() {
        let body = json!({
            "customerName": "Ivan",
            "customerEmail": "ivan@x.ru",
            "customerPhone": "+7900",
            "items": [{ "name": "Magnet", "quantity": 2, "price": 150, "total": 250 }],
            "totalAmount": 250
        });
        let order = parse_order_request(body.to_string().as_bytes())
            .unwrap()
            .into_submission()
            .unwrap();
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.items()[0].total.grouped(), "250");
        assert_eq!(order.total_amount().grouped(), "250");
    }
}
