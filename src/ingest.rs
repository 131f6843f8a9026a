//! Ingestion pipeline: sheet link in, typed stop list out.
//!
//! Stages run strictly in order: URL normalization, transport, format
//! detection, tabular parsing, column inference, record building. Every
//! stage either returns a well-formed result or raises a [`LoadError`];
//! there is no partial success.

pub mod builder;
pub mod columns;
pub mod csv;
pub mod html;
pub mod transport;
pub mod url;

use tracing::info;

use crate::model::stop::Itinerary;

/// Uniform output of both tabular parsers: lower-cased trimmed headers
/// plus a row matrix.
#[derive(Debug, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Terminal, user-facing ingestion failures. Each message is shown as-is,
/// with the transport trace available as an expandable diagnostic.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Connection failed. The sheet refused both direct and relay retrieval.")]
    ConnectionFailed,

    #[error("The sheet may not be publicly shared. Make sure \"Anyone with the link\" can view it.")]
    NotPubliclyShared,

    #[error("Received HTML but expected CSV. The sheet may not be publicly shared.")]
    UnrecognizedFormat,

    #[error("Connected successfully, but found no columns. Make sure the sheet is publicly shared.")]
    NoHeaders,

    #[error("Could not find \"Name\" or \"Maps Link\" columns.")]
    MissingRequiredColumns,

    #[error("No valid locations found.")]
    NoValidLocations,
}

pub fn looks_like_html(text: &str) -> bool {
    let head = text.trim_start().to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Runs the network-free tail of the pipeline on already-fetched text.
pub fn ingest_text(text: &str, force_csv: bool) -> Result<Itinerary, LoadError> {
    let is_html = looks_like_html(text);

    if is_html && force_csv {
        return Err(LoadError::UnrecognizedFormat);
    }

    let table = if is_html {
        html::parse_html(text)
    } else {
        csv::parse_csv(text)
    };
    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "parsed {} table",
        if is_html { "HTML" } else { "CSV" }
    );

    if table.headers.is_empty() {
        return Err(LoadError::NoHeaders);
    }

    let columns = columns::infer_columns(&table.headers)?;
    let (stops, categories) = builder::build_stops(&table.rows, &columns)?;

    Ok(Itinerary { stops, categories, trace: vec![] })
}

/// Full load: normalize the link, fetch through the transport resolver,
/// then parse and build. The trace accumulates one line per transport
/// attempt and stays available to the caller even when the load fails.
#[tracing::instrument(err, skip(client, trace))]
pub async fn load(
    client: &reqwest::Client,
    link: &str,
    force_csv: bool,
    trace: &mut Vec<String>,
) -> Result<Itinerary, LoadError> {
    let request_url = url::process_url(link, force_csv);
    trace.push(format!("Requesting: {request_url}"));

    let body = transport::fetch_document(client, &request_url, link, trace).await?;

    let mut itinerary = ingest_text(&body, force_csv)?;
    itinerary.trace = trace.clone();

    info!(
        stops = itinerary.stops.len(),
        categories = itinerary.categories.len(),
        "itinerary loaded"
    );

    Ok(itinerary)
}
