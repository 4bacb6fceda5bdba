use crate::domain::{ApiResponse, OrderPage, SessionCookies, parse_api_response};
use std::time::Duration;
use thiserror::Error;

pub const ORDER_LIST_URL: &str = "https://show.bilibili.com/api/ticket/ordercenter/list";
pub const MALL_ORDER_DELETE_URL: &str = "https://mall.bilibili.com/mall-c/order/delete";
pub const ACTIVITY_ORDER_DELETE_URL: &str = "https://show.bilibili.com/api/ticket/order/del";

/// Base URLs for the three remote operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoints {
    pub order_list: String,
    pub mall_delete: String,
    pub activity_delete: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            order_list: ORDER_LIST_URL.to_string(),
            mall_delete: MALL_ORDER_DELETE_URL.to_string(),
            activity_delete: ACTIVITY_ORDER_DELETE_URL.to_string(),
        }
    }
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REFERER: &str = "https://show.bilibili.com/";
const ORIGIN: &str = "https://show.bilibili.com";

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("{}", rejected_summary(.code, .message, .errno))]
    Rejected {
        code: i64,
        message: Option<String>,
        errno: Option<String>,
        body: String,
    },
}

fn rejected_summary(code: &i64, message: &Option<String>, errno: &Option<String>) -> String {
    format!(
        "{} (code {code}, errno {})",
        message.as_deref().unwrap_or("unknown error"),
        errno.as_deref().unwrap_or("N/A")
    )
}

/// Remote operations the fetch and delete pipeline needs.
pub trait OrdersApi {
    fn list_orders(&self, page_num: u32, page_size: u32) -> Result<OrderPage, ApiError>;
    fn delete_mall_order(&self, order_id: &str) -> Result<(), ApiError>;
    fn delete_activity_order(&self, order_id: &str) -> Result<(), ApiError>;
}

pub struct HttpOrdersClient {
    agent: ureq::Agent,
    endpoints: Endpoints,
    cookie_header: String,
}

impl HttpOrdersClient {
    pub fn new(cookies: &SessionCookies, timeout: Duration, endpoints: Endpoints) -> Self {
        Self {
            agent: make_agent(timeout),
            endpoints,
            cookie_header: cookies.header_value(),
        }
    }

    fn with_session_headers<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        request
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
            .header("Referer", REFERER)
            .header("Origin", ORIGIN)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Cookie", &self.cookie_header)
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let mut response = self
            .with_session_headers(request)
            .call()
            .map_err(|error| ApiError::Transport(error.to_string()))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|error| ApiError::Transport(error.to_string()))
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String, ApiError> {
        let request = self.agent.post(url);
        let mut response = self
            .with_session_headers(request)
            .send_form(form.iter().copied())
            .map_err(|error| ApiError::Transport(error.to_string()))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|error| ApiError::Transport(error.to_string()))
    }
}

impl OrdersApi for HttpOrdersClient {
    fn list_orders(&self, page_num: u32, page_size: u32) -> Result<OrderPage, ApiError> {
        let page_num = page_num.to_string();
        let page_size = page_size.to_string();
        let body = self.get(
            &self.endpoints.order_list,
            &[("pageNum", page_num.as_str()), ("pageSize", page_size.as_str())],
        )?;
        let response = checked_response(&body)?;
        response
            .into_order_page()
            .map_err(|error| ApiError::Malformed(error.to_string()))
    }

    fn delete_mall_order(&self, order_id: &str) -> Result<(), ApiError> {
        let body = self.get(&self.endpoints.mall_delete, &[("orderId", order_id)])?;
        checked_response(&body).map(|_| ())
    }

    fn delete_activity_order(&self, order_id: &str) -> Result<(), ApiError> {
        let body = self
            .post_form(&self.endpoints.activity_delete, &[("order_id", order_id)])?;
        checked_response(&body).map(|_| ())
    }
}

/// Parses the envelope and turns a non-zero `code` into [`ApiError::Rejected`].
pub fn checked_response(body: &str) -> Result<ApiResponse, ApiError> {
    let response =
        parse_api_response(body).map_err(|error| ApiError::Malformed(error.to_string()))?;
    if !response.is_success() {
        return Err(ApiError::Rejected {
            code: response.code,
            message: response.message,
            errno: response.errno,
            body: body.to_string(),
        });
    }
    Ok(response)
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    config.into()
}
