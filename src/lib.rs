//! Daily barcode report job: fetch the scanner feed, keep the current day's
//! records, render them as a PDF table, and email the result through an
//! authenticated SMTP relay.

pub mod config;
pub mod dates;
pub mod feed;
pub mod filter;
pub mod mailer;
pub mod model;
pub mod pipeline;
pub mod report;
