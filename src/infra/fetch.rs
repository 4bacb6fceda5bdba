use crate::domain::Order;
use crate::infra::{ApiError, OrdersApi, PAGE_DELAY, Pacer};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Error)]
#[error("failed to fetch order page {}", .page + 1)]
pub struct FetchError {
    /// Zero-based page number sent as `pageNum`.
    pub page: u32,
    #[source]
    pub source: ApiError,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageProgress {
    pub page_num: u32,
    pub page_orders: usize,
    pub fetched_total: usize,
    pub reported_total: usize,
}

/// Pulls every page of the order list. Any failing page aborts the whole fetch;
/// already accumulated orders are dropped with it.
pub fn fetch_all_orders(
    api: &dyn OrdersApi,
    page_size: u32,
    pacer: &mut dyn Pacer,
    mut on_page: impl FnMut(PageProgress),
) -> Result<Vec<Order>, FetchError> {
    let mut orders: Vec<Order> = Vec::new();
    let mut page_num = 0u32;

    loop {
        let page = api
            .list_orders(page_num, page_size)
            .map_err(|source| FetchError {
                page: page_num,
                source,
            })?;

        if page.orders.is_empty() {
            tracing::debug!(page_num, "empty order page, stopping");
            break;
        }

        let page_orders = page.orders.len();
        orders.extend(page.orders);
        tracing::debug!(
            page_num,
            page_orders,
            fetched_total = orders.len(),
            reported_total = page.total,
            "fetched order page"
        );
        on_page(PageProgress {
            page_num,
            page_orders,
            fetched_total: orders.len(),
            reported_total: page.total,
        });

        let short_page = page_orders < page_size as usize;
        if short_page || orders.len() >= page.total {
            break;
        }

        page_num += 1;
        pacer.pause(PAGE_DELAY);
    }

    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::testing::{ApiCall, ScriptedApi, page, rejected};
    use crate::infra::RecordingPacer;

    #[test]
    fn accumulates_pages_in_order_until_short_page() {
        let api = ScriptedApi::with_pages(vec![
            Ok(page(0, 3, 100)),
            Ok(page(3, 3, 100)),
            Ok(page(6, 2, 100)),
        ]);
        let mut pacer = RecordingPacer::default();
        let mut progress = Vec::new();

        let orders = fetch_all_orders(&api, 3, &mut pacer, |p| progress.push(p)).expect("fetch");

        let ids: Vec<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, ["0", "1", "2", "3", "4", "5", "6", "7"]);
        assert_eq!(api.calls().len(), 3);
        assert_eq!(pacer.pauses, vec![PAGE_DELAY, PAGE_DELAY]);
        assert_eq!(progress.len(), 3);
        assert_eq!(progress[2].fetched_total, 8);
    }

    #[test]
    fn requests_pages_from_zero_with_page_size() {
        let api = ScriptedApi::with_pages(vec![Ok(page(0, 2, 10)), Ok(page(2, 1, 10))]);
        let mut pacer = RecordingPacer::default();
        fetch_all_orders(&api, 2, &mut pacer, |_| {}).expect("fetch");
        assert_eq!(
            api.calls(),
            vec![
                ApiCall::List {
                    page_num: 0,
                    page_size: 2
                },
                ApiCall::List {
                    page_num: 1,
                    page_size: 2
                },
            ]
        );
    }

    #[test]
    fn stops_when_reported_total_is_reached() {
        let api = ScriptedApi::with_pages(vec![Ok(page(0, 2, 4)), Ok(page(2, 2, 4))]);
        let mut pacer = RecordingPacer::default();
        let orders = fetch_all_orders(&api, 2, &mut pacer, |_| {}).expect("fetch");
        assert_eq!(orders.len(), 4);
        assert_eq!(api.calls().len(), 2);
        assert_eq!(pacer.pauses.len(), 1);
    }

    #[test]
    fn stops_on_empty_page() {
        let api = ScriptedApi::with_pages(vec![Ok(page(0, 2, 50)), Ok(page(0, 0, 50))]);
        let mut pacer = RecordingPacer::default();
        let orders = fetch_all_orders(&api, 2, &mut pacer, |_| {}).expect("fetch");
        assert_eq!(orders.len(), 2);
        assert_eq!(api.calls().len(), 2);
    }

    #[test]
    fn overlapping_pages_keep_duplicates() {
        let api = ScriptedApi::with_pages(vec![Ok(page(0, 2, 4)), Ok(page(1, 2, 4))]);
        let mut pacer = RecordingPacer::default();
        let orders = fetch_all_orders(&api, 2, &mut pacer, |_| {}).expect("fetch");
        let ids: Vec<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, ["0", "1", "1", "2"]);
    }

    #[test]
    fn failing_page_aborts_without_partial_result() {
        let api = ScriptedApi::with_pages(vec![
            Ok(page(0, 2, 10)),
            Err(rejected(-101, "not logged in")),
            Ok(page(4, 2, 10)),
        ]);
        let mut pacer = RecordingPacer::default();
        let error = fetch_all_orders(&api, 2, &mut pacer, |_| {}).expect_err("fetch fails");
        assert_eq!(error.page, 1);
        assert!(matches!(error.source, ApiError::Rejected { code: -101, .. }));
        assert_eq!(api.calls().len(), 2);
        assert_eq!(error.to_string(), "failed to fetch order page 2");
    }

    #[test]
    fn transport_failure_on_first_page_is_fatal() {
        let api = ScriptedApi::with_pages(vec![Err(ApiError::Transport("timed out".to_string()))]);
        let mut pacer = RecordingPacer::default();
        let error = fetch_all_orders(&api, 20, &mut pacer, |_| {}).expect_err("fetch fails");
        assert_eq!(error.page, 0);
        assert!(pacer.pauses.is_empty());
    }
}
