pub const UNKNOWN_ORDER_NAME: &str = "Unknown order";
pub const UNKNOWN_ORDER_STATUS: &str = "Unknown status";

const WORKSHOP_ORDER_TYPE: i64 = 9;
const MALL_ORDER_TYPE: i64 = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderCategory {
    Workshop,
    Mall,
    Activity,
}

impl OrderCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Workshop => "workshop",
            Self::Mall => "mall",
            Self::Activity => "activity",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub order_type: Option<i64>,
    pub display_name: String,
    pub status_text: String,
    pub created_at: Option<i64>,
}

impl Order {
    pub fn category(&self) -> OrderCategory {
        classify(self)
    }
}

pub fn classify(order: &Order) -> OrderCategory {
    match order.order_type {
        Some(WORKSHOP_ORDER_TYPE) => OrderCategory::Workshop,
        Some(MALL_ORDER_TYPE) => OrderCategory::Mall,
        _ => OrderCategory::Activity,
    }
}

/// One slice of the remote order list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: usize,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}
