mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{InputCapability, select_orders};
use crate::cli::{
    CliInvocation, Lifecycle, RunError, RunOptions, ask_restart, build_client, confirm_deletion,
    load_cookies, write_selection_summary,
};
use crate::domain::Order;
use crate::infra::{
    ApiError, BatchProgress, DeleteFailure, FetchError, SleepPacer, delete_selected_orders,
    fetch_all_orders,
};
use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "BILI_ORDERS_LOG";

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("terminal I/O error")]
    Io(#[from] io::Error),
}

fn main() {
    // Read before anything can spawn a thread; the local offset lookup refuses to run otherwise.
    let date_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    init_logging();

    if let Err(error) = run_main(date_offset) {
        let mut err = io::stderr().lock();
        let _ = cli::write_error_report(&mut err, &error);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run_main(date_offset: UtcOffset) -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            cli::print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            cli::print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::List(options) => Ok(cli::run_list(&options, date_offset)?),
        CliInvocation::Interactive(options) => run_interactive(&options, date_offset),
    }
}

fn run_interactive(options: &RunOptions, date_offset: UtcOffset) -> Result<(), MainError> {
    let capability = InputCapability::detect();
    if let InputCapability::Unavailable { reason } = &capability {
        tracing::warn!(%reason, "interactive selection will be unavailable");
    }

    let mut lifecycle = Lifecycle::Run;
    while lifecycle == Lifecycle::Run {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            run_session(options, &capability, date_offset)
        }));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(error)) => report_error(&error),
            Err(payload) => report_panic(payload.as_ref()),
        }

        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();
        lifecycle = ask_restart(&mut input, &mut out)?;
        if lifecycle == Lifecycle::Run {
            writeln!(out, "\nRestarting...\n")?;
        }
    }

    let mut out = io::stdout().lock();
    writeln!(out, "Exited.")?;
    Ok(())
}

fn run_session(
    options: &RunOptions,
    capability: &InputCapability,
    date_offset: UtcOffset,
) -> Result<(), RunError> {
    let mut out = io::stdout();
    print_banner(&mut out)?;

    let cookies = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        load_cookies(
            options,
            std::env::var(cli::COOKIE_ENV).ok(),
            &mut input,
            &mut out,
        )?
    };
    let client = build_client(&cookies);
    let mut pacer = SleepPacer;

    writeln!(out, "Fetching orders...")?;
    let orders = fetch_all_orders(&client, options.page_size, &mut pacer, |progress| {
        let mut out = io::stdout().lock();
        let _ = writeln!(
            out,
            "Page {}: {} orders ({}/{})",
            progress.page_num + 1,
            progress.page_orders,
            progress.fetched_total,
            progress.reported_total
        );
    })?;
    writeln!(out, "✓ Fetched {} orders in total", orders.len())?;

    if orders.is_empty() {
        writeln!(out, "No orders found.")?;
        return Ok(());
    }

    let outcome = select_orders(&orders, capability, date_offset)?;
    let indices = outcome.indices();
    if indices.is_empty() {
        writeln!(out, "No orders selected.")?;
        return Ok(());
    }

    let chosen: Vec<&Order> = indices.iter().filter_map(|index| orders.get(*index)).collect();
    write_selection_summary(&mut out, &chosen)?;

    let confirmed = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        confirm_deletion(&mut input, &mut out)?
    };
    if !confirmed {
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }

    writeln!(out, "\nDeleting {} orders...", indices.len())?;
    let summary = delete_selected_orders(&client, &orders, indices, &mut pacer, print_batch_progress);
    writeln!(
        out,
        "\nDone. Attempted: {}, succeeded: {}, failed: {}",
        summary.attempted(),
        summary.succeeded,
        summary.failed
    )?;
    Ok(())
}

fn print_banner(out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "{} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(
        out,
        "⚠ Make sure you are allowed to delete these orders. Deletion cannot be undone."
    )?;
    writeln!(out, "Tip: widen the window if order rows wrap.")?;
    writeln!(out)
}

fn print_batch_progress(event: BatchProgress<'_>) {
    let mut out = io::stdout().lock();
    match event {
        BatchProgress::Attempting {
            position,
            total,
            order,
        } => {
            let _ = writeln!(
                out,
                "[{position}/{total}] Deleting order: {} ({})",
                order.display_name, order.order_id
            );
        }
        BatchProgress::Missing {
            position,
            total,
            index,
        } => {
            let _ = writeln!(out, "[{position}/{total}] No order at index {index}");
        }
        BatchProgress::Finished { outcome } => {
            let label = outcome.category.label();
            if outcome.succeeded {
                let _ = writeln!(out, "✓ {label} order {} deleted", outcome.order_id);
                return;
            }
            let detail = outcome.error_detail().unwrap_or_default();
            let _ = writeln!(
                out,
                "✗ {label} order {} not deleted: {detail}",
                outcome.order_id
            );
            if let Some(DeleteFailure::Api(ApiError::Rejected { body, .. })) = &outcome.error {
                let _ = writeln!(out, "   response: {body}");
            }
        }
    }
}

fn report_error(error: &RunError) {
    let mut err = io::stderr().lock();
    let _ = writeln!(err);
    let _ = cli::write_error_report(&mut err, error);
    if let RunError::Fetch(FetchError {
        source: ApiError::Rejected { body, .. },
        ..
    }) = error
    {
        let _ = writeln!(err, "  server response: {body}");
    }
    if matches!(error, RunError::Fetch(_)) {
        let _ = writeln!(err, "Failed to fetch orders; check that the cookies are valid.");
    }
}

fn report_panic(payload: &(dyn Any + Send)) {
    let message = payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    let mut err = io::stderr().lock();
    let _ = writeln!(err, "\nUnexpected failure: {message}");
}
