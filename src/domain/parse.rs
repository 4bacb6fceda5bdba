use crate::domain::{Order, OrderPage, UNKNOWN_ORDER_NAME, UNKNOWN_ORDER_STATUS};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// The `{code, message|msg, errno, data}` envelope shared by every endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub code: i64,
    pub message: Option<String>,
    pub errno: Option<String>,
    data: Option<Value>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    pub fn into_order_page(self) -> Result<OrderPage, ParseError> {
        let Some(data) = self.data else {
            return Ok(OrderPage {
                orders: Vec::new(),
                total: 0,
            });
        };
        let data: ListData = serde_json::from_value(data)?;
        let orders = data
            .list
            .unwrap_or_default()
            .into_iter()
            .map(order_from_record)
            .collect();
        let total = data
            .total
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|total| usize::try_from(total).ok())
            .unwrap_or(0);
        Ok(OrderPage { orders, total })
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: Option<i64>,
    message: Option<String>,
    msg: Option<String>,
    errno: Option<Value>,
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    list: Option<Vec<OrderRecord>>,
    total: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OrderRecord {
    #[serde(default)]
    order_id: Value,
    #[serde(default)]
    order_type: Value,
    #[serde(default)]
    rows: Option<Vec<OrderRowRecord>>,
    status_name: Option<String>,
    status_subname: Option<String>,
    #[serde(default)]
    order_ctime: Value,
}

#[derive(Debug, Deserialize)]
struct OrderRowRecord {
    name: Option<String>,
}

pub fn parse_api_response(body: &str) -> Result<ApiResponse, ParseError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let code = envelope.code.ok_or(ParseError::MissingField("code"))?;
    let message = non_empty(envelope.msg).or_else(|| non_empty(envelope.message));
    let errno = envelope.errno.and_then(|errno| match errno {
        Value::Null => None,
        Value::String(text) => non_empty(Some(text)),
        other => Some(other.to_string()),
    });
    Ok(ApiResponse {
        code,
        message,
        errno,
        data: envelope.data.filter(|data| !data.is_null()),
    })
}

fn order_from_record(record: OrderRecord) -> Order {
    let order_id = match record.order_id {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let display_name = record
        .rows
        .and_then(|rows| rows.into_iter().next())
        .and_then(|row| row.name)
        .unwrap_or_else(|| UNKNOWN_ORDER_NAME.to_string());
    let status_text = non_empty(record.status_name)
        .or_else(|| non_empty(record.status_subname))
        .unwrap_or_else(|| UNKNOWN_ORDER_STATUS.to_string());
    let created_at = record.order_ctime.as_i64().filter(|ts| *ts != 0);

    Order {
        order_id,
        order_type: record.order_type.as_i64(),
        display_name,
        status_text,
        created_at,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}
