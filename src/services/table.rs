// src/services/table.rs
use scraper::{Html, Selector};

use crate::error::{Result, SyncError};

/// Row/column access to an HTML table document.
///
/// `section` is a CSS selector for the element whose `tr` children are the rows,
/// e.g. `body > table:nth-child(2) > tbody`. Rows and columns are 1-based, as in `nth-child`.
pub struct HtmlTable {
    document: Html,
}

impl HtmlTable {
    pub fn parse(html: &str) -> Self {
        HtmlTable {
            document: Html::parse_document(html),
        }
    }

    /// Number of rows in `section` that have a cell at `column`.
    pub fn row_count(&self, section: &str, column: usize) -> Result<usize> {
        let selector = selector(&format!("{} > tr > td:nth-child({})", section, column))?;
        Ok(self.document.select(&selector).count())
    }

    /// Text of the cell at (`row`, `column`) of `section`, or an empty string when there is none.
    pub fn cell_text(&self, section: &str, row: usize, column: usize) -> Result<String> {
        let selector = selector(&format!(
            "{} > tr:nth-child({}) > td:nth-child({})",
            section, row, column
        ))?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .map(|cell| cell.text().collect::<String>())
            .unwrap_or_default())
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SyncError::Selector(format!("{}: {:?}", css, e)))
}
