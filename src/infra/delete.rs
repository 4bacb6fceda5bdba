use crate::domain::{BatchSummary, Order, OrderCategory};
use crate::infra::{ApiError, DELETE_DELAY, OrdersApi, Pacer};
use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DeleteFailure {
    #[error("unsupported category, manual deletion required")]
    UnsupportedCategory,

    #[error("no order at index {0}")]
    MissingOrder(usize),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeleteOutcome {
    pub order_id: String,
    pub category: OrderCategory,
    pub succeeded: bool,
    pub error: Option<DeleteFailure>,
}

impl DeleteOutcome {
    pub fn error_detail(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum BatchProgress<'a> {
    Attempting {
        position: usize,
        total: usize,
        order: &'a Order,
    },
    /// The position refers to an index outside the order collection.
    Missing {
        position: usize,
        total: usize,
        index: usize,
    },
    Finished {
        outcome: &'a DeleteOutcome,
    },
}

/// Deletes one order through the endpoint matching its category. Each call is
/// attempted once; failures are folded into the outcome.
pub fn delete_order(api: &dyn OrdersApi, order: &Order) -> DeleteOutcome {
    let category = order.category();
    let result = match category {
        OrderCategory::Workshop => Err(DeleteFailure::UnsupportedCategory),
        OrderCategory::Mall => api
            .delete_mall_order(&order.order_id)
            .map_err(DeleteFailure::from),
        OrderCategory::Activity => api
            .delete_activity_order(&order.order_id)
            .map_err(DeleteFailure::from),
    };

    match result {
        Ok(()) => {
            tracing::info!(order_id = %order.order_id, category = category.label(), "order deleted");
            DeleteOutcome {
                order_id: order.order_id.clone(),
                category,
                succeeded: true,
                error: None,
            }
        }
        Err(error) => {
            tracing::warn!(
                order_id = %order.order_id,
                category = category.label(),
                %error,
                "order delete failed"
            );
            DeleteOutcome {
                order_id: order.order_id.clone(),
                category,
                succeeded: false,
                error: Some(error),
            }
        }
    }
}

/// Deletes `orders[index]` for every index in the given order, pausing between
/// attempts. Individual failures never stop the batch.
pub fn delete_selected_orders(
    api: &dyn OrdersApi,
    orders: &[Order],
    indices: &[usize],
    pacer: &mut dyn Pacer,
    mut on_progress: impl FnMut(BatchProgress<'_>),
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let total = indices.len();

    for (offset, &index) in indices.iter().enumerate() {
        let position = offset + 1;
        let outcome = match orders.get(index) {
            Some(order) => {
                on_progress(BatchProgress::Attempting {
                    position,
                    total,
                    order,
                });
                delete_order(api, order)
            }
            None => {
                on_progress(BatchProgress::Missing {
                    position,
                    total,
                    index,
                });
                tracing::warn!(
                    position,
                    index,
                    orders = orders.len(),
                    "selected index out of range"
                );
                DeleteOutcome {
                    order_id: String::new(),
                    category: OrderCategory::Activity,
                    succeeded: false,
                    error: Some(DeleteFailure::MissingOrder(index)),
                }
            }
        };

        if outcome.succeeded {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
        on_progress(BatchProgress::Finished { outcome: &outcome });

        if position < total {
            pacer.pause(DELETE_DELAY);
        }
    }

    summary
}
