//! Batch pipeline: input rows → fetch → extract → enriched rows + error ledger.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use wikiloot_crawler::{ItemPage, PageFetcher};
use wikiloot_extract::{ExtractOptions, Extraction, extract_item};
use wikiloot_shared::{ItemRecord, Result};
use wikiloot_storage::{RetryPrompt, write_error_rows, write_items, write_with_retry};

use crate::ledger::ErrorLedger;
use crate::progress::{ProgressReporter, ProgressTracker};

/// Options for [`run_batch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub extract: ExtractOptions,
}

/// One input row after processing.
#[derive(Debug, Clone, PartialEq)]
pub struct RowResult {
    /// The input row with whatever derived fields were recovered.
    pub record: ItemRecord,
    /// Empty when the row was fully enriched.
    pub errors: Vec<String>,
}

impl RowResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Every input row, in input order.
    pub rows: Vec<RowResult>,
    pub ledger: ErrorLedger,
}

impl BatchOutcome {
    /// Rows without errors.
    pub fn enriched(&self) -> impl Iterator<Item = &RowResult> {
        self.rows.iter().filter(|row| row.is_ok())
    }

    /// Rows destined for the error table.
    pub fn failed(&self) -> impl Iterator<Item = &RowResult> {
        self.rows.iter().filter(|row| !row.is_ok())
    }

    /// All records, failed ones included, for the output table.
    pub fn records(&self) -> Vec<ItemRecord> {
        self.rows.iter().map(|row| row.record.clone()).collect()
    }
}

/// Process every row in order.
///
/// No row failure stops the batch: fetch errors, structural errors, field
/// errors and description rejections all land in the ledger and the row's
/// `errors`, and processing moves on.
#[instrument(skip_all, fields(rows = records.len(), mode = ?options.extract.mode))]
pub async fn run_batch<F: PageFetcher>(
    records: Vec<ItemRecord>,
    fetcher: &F,
    options: &BatchOptions,
    progress: &dyn ProgressReporter,
) -> BatchOutcome {
    let start = Instant::now();
    let total = records.len();
    let mut tracker = ProgressTracker::new(total);
    let mut outcome = BatchOutcome {
        rows: Vec::with_capacity(total),
        ledger: ErrorLedger::new(),
    };

    info!(total, "parsing started");
    progress.phase("Parsing items");

    for (index, mut record) in records.into_iter().enumerate() {
        let errors = match fetcher.fetch(&record.url).await {
            Ok(body) => enrich(&mut record, &body, &options.extract),
            Err(err) => vec![err.to_string()],
        };

        if errors.is_empty() {
            debug!(item = %record.name, "row enriched");
        } else {
            warn!(item = %record.name, errors = ?errors, "row failed");
            progress.row_failed(&record.name, &errors);
            outcome.ledger.record(&record.name, errors.iter().cloned());
        }
        outcome.rows.push(RowResult { record, errors });

        if let Some(pct) = tracker.advance(index + 1) {
            progress.percent(pct);
        }
    }

    let enriched = outcome.enriched().count();
    let failed = total - enriched;
    info!(
        enriched,
        failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "parsing complete"
    );
    progress.done(enriched, failed);

    outcome
}

/// Extract from a fetched body and write recovered fields onto `record`.
///
/// Returns the row's ledger messages; empty on success.
fn enrich(record: &mut ItemRecord, body: &str, options: &ExtractOptions) -> Vec<String> {
    let page = ItemPage::parse(body);
    let extraction = extract_item(&page, record.variation, options);
    debug!(
        item = %record.name,
        category = ?record.category_kind(),
        requested = record.variation,
        effective = extraction.effective_variation,
        "page extracted"
    );
    merge(record, &extraction);
    extraction.errors()
}

fn merge(record: &mut ItemRecord, extraction: &Extraction) {
    let properties = &extraction.properties;
    record.rarity = properties.rarity;
    record.weight_lb = properties.weight;
    record.price_gp = properties.price;
    record.description = extraction
        .description
        .as_ref()
        .and_then(|d| d.text())
        .map(str::to_string);
}

/// Write the output table and the error table.
///
/// Each write is retried once through `prompt` when the destination is
/// locked. The outcome stays borrowed, so nothing is recomputed on retry.
#[instrument(skip_all, fields(output = %output.display(), errors = %errors.display()))]
pub fn save_outcome<P: RetryPrompt + ?Sized>(
    outcome: &BatchOutcome,
    output: &Path,
    errors: &Path,
    prompt: &P,
) -> Result<()> {
    let records = outcome.records();
    write_with_retry(output, prompt, || write_items(output, &records))?;
    write_with_retry(errors, prompt, || {
        write_error_rows(errors, outcome.failed().map(|row| &row.record))
    })?;

    info!(
        rows = records.len(),
        failed = outcome.failed().count(),
        "tables written"
    );
    Ok(())
}
