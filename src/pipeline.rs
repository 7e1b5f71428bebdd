use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::config::Config;
use crate::dates;
use crate::feed::FeedClient;
use crate::filter;
use crate::mailer::{DeliveryReceipt, Mailer};
use crate::report;

/// Terminal state of one scheduled invocation.
#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing matched the current day: no document rendered, no email sent.
    NoData,
    Sent {
        records: usize,
        receipt: DeliveryReceipt,
    },
}

/// Run fetch → filter → render → dispatch for today in the configured
/// reference timezone.
pub async fn run(cfg: &Config, feed: &FeedClient, mailer: &dyn Mailer) -> Result<RunOutcome> {
    run_for_date(cfg, feed, mailer, dates::today_in(cfg.report.timezone)).await
}

/// Same as [`run`] with the business day injected; tests pin the date here.
///
/// Fetch failures have already degraded to an empty feed inside
/// [`FeedClient::fetch`], and date failures are contained per record in the
/// filter. An empty filtered set short-circuits cleanly. Render and dispatch
/// failures are fatal for the run and propagate with context.
pub async fn run_for_date(
    cfg: &Config,
    feed: &FeedClient,
    mailer: &dyn Mailer,
    today: NaiveDate,
) -> Result<RunOutcome> {
    let records = feed.fetch().await;
    let todays = filter::filter_today(records, today);
    if todays.is_empty() {
        info!(%today, "no records for the current day; not sending a report");
        return Ok(RunOutcome::NoData);
    }

    let title = format!("{} - {}", cfg.report.title, today.format("%-m/%-d/%Y"));
    let document =
        report::render(&todays, &title).context("failed to render the daily report")?;
    let body = format!(
        "Attached is the daily barcode report with {} items.",
        todays.len()
    );
    let receipt = mailer
        .send(&document, &title, &body)
        .await
        .context("failed to deliver the daily report")?;

    info!(records = todays.len(), "daily report delivered");
    Ok(RunOutcome::Sent {
        records: todays.len(),
        receipt,
    })
}
