use crate::domain::{Order, OrderPage};
use crate::infra::{ApiError, OrdersApi};
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ApiCall {
    List { page_num: u32, page_size: u32 },
    DeleteMall(String),
    DeleteActivity(String),
}

/// Replays queued responses in call order; an exhausted queue answers with an
/// empty page or a successful delete.
#[derive(Debug, Default)]
pub struct ScriptedApi {
    pages: RefCell<VecDeque<Result<OrderPage, ApiError>>>,
    deletes: RefCell<VecDeque<Result<(), ApiError>>>,
    calls: RefCell<Vec<ApiCall>>,
}

impl ScriptedApi {
    pub fn with_pages(pages: Vec<Result<OrderPage, ApiError>>) -> Self {
        Self {
            pages: RefCell::new(pages.into()),
            ..Self::default()
        }
    }

    pub fn with_deletes(deletes: Vec<Result<(), ApiError>>) -> Self {
        Self {
            deletes: RefCell::new(deletes.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }
}

impl OrdersApi for ScriptedApi {
    fn list_orders(&self, page_num: u32, page_size: u32) -> Result<OrderPage, ApiError> {
        self.calls.borrow_mut().push(ApiCall::List {
            page_num,
            page_size,
        });
        self.pages.borrow_mut().pop_front().unwrap_or(Ok(OrderPage {
            orders: Vec::new(),
            total: 0,
        }))
    }

    fn delete_mall_order(&self, order_id: &str) -> Result<(), ApiError> {
        self.calls
            .borrow_mut()
            .push(ApiCall::DeleteMall(order_id.to_string()));
        self.deletes.borrow_mut().pop_front().unwrap_or(Ok(()))
    }

    fn delete_activity_order(&self, order_id: &str) -> Result<(), ApiError> {
        self.calls
            .borrow_mut()
            .push(ApiCall::DeleteActivity(order_id.to_string()));
        self.deletes.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}

pub fn order(order_id: &str, order_type: Option<i64>) -> Order {
    Order {
        order_id: order_id.to_string(),
        order_type,
        display_name: format!("order {order_id}"),
        status_text: "paid".to_string(),
        created_at: Some(1_700_000_000),
    }
}

pub fn page(first_id: usize, count: usize, total: usize) -> OrderPage {
    OrderPage {
        orders: (first_id..first_id + count)
            .map(|id| order(&id.to_string(), None))
            .collect(),
        total,
    }
}

pub fn rejected(code: i64, message: &str) -> ApiError {
    ApiError::Rejected {
        code,
        message: Some(message.to_string()),
        errno: None,
        body: format!(r#"{{"code":{code},"message":"{message}"}}"#),
    }
}
