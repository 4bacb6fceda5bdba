mod prompt;

use crate::app::SelectionError;
use crate::domain::{CredentialError, Order, SessionCookies, format_order_date};
use crate::infra::{
    DEFAULT_PAGE_SIZE, Endpoints, FetchError, HttpOrdersClient, SleepPacer, fetch_all_orders,
};
use std::error::Error as StdError;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use time::UtcOffset;

pub use prompt::*;

pub const COOKIE_ENV: &str = "BILI_COOKIE";
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Interactive(RunOptions),
    List(RunOptions),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunOptions {
    pub cookie_file: Option<PathBuf>,
    pub page_size: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cookie_file: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidFlagValue { flag: String, value: String },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("failed to read cookie file {path}")]
    CookieFile { path: String, source: io::Error },

    #[error("invalid cookies")]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut iter = args.iter().skip(1);
    let list = match args.get(1).map(String::as_str) {
        Some("list") => {
            let _ = iter.next();
            true
        }
        Some(arg) if !arg.starts_with('-') => {
            return Err(CliParseError::UnknownSubcommand(arg.to_string()));
        }
        _ => false,
    };

    let mut options = RunOptions::default();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--cookie-file" => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue(arg.to_string()))?;
                options.cookie_file = Some(PathBuf::from(value));
            }
            "--page-size" => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue(arg.to_string()))?;
                options.page_size = parse_page_size(arg, value)?;
            }
            _ if arg.starts_with('-') => {
                return Err(CliParseError::UnknownFlag(arg.to_string()));
            }
            _ => return Err(CliParseError::UnknownSubcommand(arg.to_string())),
        }
    }

    if list {
        Ok(CliInvocation::List(options))
    } else {
        Ok(CliInvocation::Interactive(options))
    }
}

fn parse_page_size(flag: &str, value: &str) -> Result<u32, CliParseError> {
    match value.parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(CliParseError::InvalidFlagValue {
            flag: flag.to_string(),
            value: value.to_string(),
        }),
    }
}

pub fn print_help() {
    let text = format!(
        "{name}: list and delete Bilibili show/mall orders\n\nUSAGE:\n  {name} [--cookie-file PATH] [--page-size N]        Select orders interactively and delete them\n  {name} list [--cookie-file PATH] [--page-size N]   Print all orders without deleting\n  {name} --help | --version\n\nFLAGS:\n  --cookie-file PATH  Read the cookie string from a file\n  --page-size N       Orders per list request (default: {DEFAULT_PAGE_SIZE})\n\nOUTPUT (list):\n  seq<TAB>order_id<TAB>category<TAB>status<TAB>created<TAB>name\n\nENV:\n  {COOKIE_ENV}           Cookie string (used when --cookie-file is not given)\n  BILI_ORDERS_LOG       Log filter for stderr diagnostics (default: warn)\n",
        name = env!("CARGO_PKG_NAME")
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

/// Writes `error` and then one `caused by:` line per source. Error messages do not
/// repeat their source, so each cause appears once.
pub fn write_error_report(
    out: &mut dyn Write,
    error: &(dyn StdError + 'static),
) -> io::Result<()> {
    writeln!(out, "Error: {error}")?;
    let mut source = error.source();
    while let Some(cause) = source {
        writeln!(out, "  caused by: {cause}")?;
        source = cause.source();
    }
    Ok(())
}

/// Cookie source precedence: `--cookie-file`, then the environment value, then an
/// interactive prompt.
pub fn load_cookies(
    options: &RunOptions,
    env_value: Option<String>,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<SessionCookies, RunError> {
    if let Some(path) = &options.cookie_file {
        let raw = fs::read_to_string(path).map_err(|source| RunError::CookieFile {
            path: path.display().to_string(),
            source,
        })?;
        return Ok(SessionCookies::parse(&raw)?);
    }

    if let Some(raw) = env_value.filter(|value| !value.trim().is_empty()) {
        return Ok(SessionCookies::parse(&raw)?);
    }

    let raw = prompt_line(input, output, "Enter your Bilibili cookies: ")?.unwrap_or_default();
    Ok(SessionCookies::parse(&raw)?)
}

pub fn build_client(cookies: &SessionCookies) -> HttpOrdersClient {
    if cookies.get("SESSDATA").is_none() {
        tracing::warn!("cookie string has no SESSDATA entry; requests will likely be rejected");
    }
    tracing::debug!(cookies = cookies.count(), "using session cookies");
    HttpOrdersClient::new(cookies, HTTP_TIMEOUT, Endpoints::default())
}

pub fn run_list(options: &RunOptions, date_offset: UtcOffset) -> Result<(), RunError> {
    let cookies = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut prompt_out = io::stderr();
        load_cookies(options, std::env::var(COOKIE_ENV).ok(), &mut input, &mut prompt_out)?
    };
    let client = build_client(&cookies);

    let mut pacer = SleepPacer;
    let orders = fetch_all_orders(&client, options.page_size, &mut pacer, |progress| {
        let mut err = io::stderr().lock();
        let _ = writeln!(
            err,
            "page {}: {} orders",
            progress.page_num + 1,
            progress.page_orders
        );
    })?;

    let mut out = io::stdout().lock();
    write_order_lines(&mut out, &orders, date_offset)?;
    Ok(())
}

pub fn write_order_lines(
    out: &mut dyn Write,
    orders: &[Order],
    date_offset: UtcOffset,
) -> io::Result<()> {
    for (index, order) in orders.iter().enumerate() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            index + 1,
            order.order_id,
            order.category().label(),
            order.status_text,
            format_order_date(order.created_at, date_offset),
            order.display_name
        )?;
    }
    Ok(())
}
