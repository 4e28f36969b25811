// src/services/index.rs
use async_trait::async_trait;
use log::{info, warn};
use regex::Regex;
use std::marker::PhantomData;
use std::sync::OnceLock;

use crate::error::Result;
use crate::models::{IndexFamily, IndexRaw, IndexRecord, ReturnRecord};
use crate::services::calculations::derive_returns;
use crate::services::clock::Clock;
use crate::services::fetch::DocumentFetcher;
use crate::services::pipeline::{DataFamily, DerivedSeries};
use crate::services::table::HtmlTable;

pub const SET_INDEX_URL: &str = "https://www.set.or.th/static/mktstat/Table_Index.xls";
pub const SET_YIELD_URL: &str = "https://www.set.or.th/static/mktstat/Table_Yield.xls";

/// Rows of the index-level table. The data rows sit in the table's second `thead`.
const INDEX_SECTION: &str = "body > table:nth-child(2) > thead:nth-child(2)";
/// Rows of the dividend-yield table, led by one offset row.
const YIELD_SECTION: &str = "body > table:nth-child(2) > tbody";
const PERIOD_COLUMN: usize = 1;

/// Index levels and dividend yields for one family, read from the SET statistics tables.
#[derive(Debug, Clone)]
pub struct IndexSource<F> {
    pub index_url: String,
    pub yield_url: String,
    family: PhantomData<F>,
}

impl<F: IndexFamily> IndexSource<F> {
    pub fn new(index_url: impl Into<String>, yield_url: impl Into<String>) -> Self {
        IndexSource {
            index_url: index_url.into(),
            yield_url: yield_url.into(),
            family: PhantomData,
        }
    }
}

impl<F: IndexFamily> Default for IndexSource<F> {
    fn default() -> Self {
        Self::new(SET_INDEX_URL, SET_YIELD_URL)
    }
}

#[async_trait]
impl<F: IndexFamily> DataFamily for IndexSource<F> {
    type Raw = IndexRaw<F>;
    type Record = IndexRecord<F>;

    const TABLE: &'static str = F::INFO_TABLE;
    const LABEL: &'static str = F::INFO_LABEL;

    async fn fetch(
        &self,
        fetcher: &dyn DocumentFetcher,
        _clock: &dyn Clock,
    ) -> Result<Vec<IndexRaw<F>>> {
        let (index_html, yield_html) = tokio::try_join!(
            fetcher.fetch(&self.index_url),
            fetcher.fetch(&self.yield_url)
        )?;
        parse_index_tables::<F>(&index_html, &yield_html)
    }

    fn derived(&self, records: &[IndexRecord<F>]) -> Option<DerivedSeries<ReturnRecord>> {
        Some(DerivedSeries {
            table: F::RETURN_TABLE,
            label: F::RETURN_LABEL,
            records: derive_returns(records),
        })
    }
}

/// Pairs each row of the index table with its dividend-yield row, oldest first.
///
/// The two tables must line up exactly (the yield table carries one extra leading row);
/// otherwise nothing is returned.
pub fn parse_index_tables<F: IndexFamily>(
    index_html: &str,
    yield_html: &str,
) -> Result<Vec<IndexRaw<F>>> {
    let index_table = HtmlTable::parse(index_html);
    let yield_table = HtmlTable::parse(yield_html);

    let index_rows = index_table.row_count(INDEX_SECTION, F::COLUMN)?;
    let yield_rows = yield_table.row_count(YIELD_SECTION, F::COLUMN)?;

    if index_rows == 0 || yield_rows == 0 || index_rows + 1 != yield_rows {
        warn!(
            "{} tables do not line up ({} index rows, {} yield rows); skipping",
            F::NAME,
            index_rows,
            yield_rows
        );
        return Ok(Vec::new());
    }

    let last_row = index_rows.saturating_sub(F::SKIPPED_TAIL_ROWS);
    let mut records = Vec::with_capacity(last_row);
    for row in 1..=last_row {
        let period = index_table.cell_text(INDEX_SECTION, row, PERIOD_COLUMN)?;
        let (month, year) = split_period(&period);
        let level = parse_number(&index_table.cell_text(INDEX_SECTION, row, F::COLUMN)?);
        let dividend_yield = parse_number(&yield_table.cell_text(YIELD_SECTION, row + 1, F::COLUMN)?);

        records.push(IndexRaw {
            year,
            month,
            level,
            dividend_yield,
            family: PhantomData,
        });
    }
    records.reverse();

    info!("Parsed {} {} rows", records.len(), F::NAME);
    Ok(records)
}

/// Splits a `Month-Year` cell such as `Jan-2024`.
pub fn split_period(text: &str) -> (Option<String>, Option<i32>) {
    let mut parts = text.split('-');
    let month = parts
        .next()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    let year = parts.next().and_then(|y| y.trim().parse::<i32>().ok());
    (month, year)
}

/// Parses the leading decimal of a cell after dropping thousands separators.
pub fn parse_number(text: &str) -> Option<f64> {
    static LEADING_NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = LEADING_NUMBER.get_or_init(|| {
        Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?").expect("valid number pattern")
    });

    let cleaned = text.replace(',', "");
    re.find(cleaned.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
