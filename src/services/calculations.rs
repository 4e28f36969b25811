// src/services/calculations.rs
use crate::models::{IndexFamily, IndexRecord, ReturnRecord};

const MONTHS_PER_YEAR: usize = 12;

/// Zero and non-finite values count as absent.
fn or_default(value: f64, default: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        default
    } else {
        value
    }
}

/// Month-over-month change compounded to an annual rate, in percent.
fn annualized_monthly_return(current: f64, previous: f64) -> f64 {
    ((current / previous).powi(MONTHS_PER_YEAR as i32) - 1.0) * 100.0
}

/// Plain year-over-year change, in percent.
fn yearly_return(current: f64, year_ago: f64) -> f64 {
    (current / year_ago - 1.0) * 100.0
}

/// Derives monthly and yearly price and total returns for an ascending index series.
///
/// The output has one record per input month. The first month has no monthly figures and
/// the first twelve have no yearly figures; those are reported as zero.
pub fn derive_returns<F: IndexFamily>(series: &[IndexRecord<F>]) -> Vec<ReturnRecord> {
    series
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let current = or_default(record.level, 0.0);
            let dividend = or_default(record.dividend_yield, 0.0);

            let (monthly_return, monthly_tri) = if i > 0 {
                let previous = or_default(series[i - 1].level, 1.0);
                let r = annualized_monthly_return(current, previous);
                (r, r + dividend)
            } else {
                (0.0, 0.0)
            };

            let (yearly_return, yearly_tri) = if i >= MONTHS_PER_YEAR {
                let year_ago = or_default(series[i - MONTHS_PER_YEAR].level, 1.0);
                let r = yearly_return(current, year_ago);
                (r, r + dividend)
            } else {
                (0.0, 0.0)
            };

            ReturnRecord {
                year: record.year,
                month: record.month.clone(),
                yearly_return,
                monthly_return,
                yearly_tri,
                monthly_tri,
            }
        })
        .collect()
}
