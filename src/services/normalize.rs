// src/services/normalize.rs
//
// Field-by-field normalization of fetched records. Numeric fields default to zero;
// key fields never do.
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Result, SyncError};
use crate::models::{parse_asof, BondYield, BondYieldRaw, IndexFamily, IndexRaw, IndexRecord};

pub trait Normalize {
    type Output;

    fn normalize(self) -> Result<Self::Output>;
}

pub fn normalize_all<N: Normalize>(records: Vec<N>) -> Result<Vec<N::Output>> {
    records.into_iter().map(Normalize::normalize).collect()
}

/// Missing and non-finite values become `0`.
pub fn zero_if_missing(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn tenor_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Normalize for BondYieldRaw {
    type Output = BondYield;

    fn normalize(self) -> Result<BondYield> {
        let text = self.asof.ok_or_else(|| SyncError::InvalidKey {
            family: "Bond Yield",
            reason: "missing asof".to_string(),
        })?;
        let asof = parse_asof(&text).ok_or_else(|| SyncError::InvalidKey {
            family: "Bond Yield",
            reason: format!("unparseable asof {:?}", text),
        })?;

        let yields: BTreeMap<String, f64> = self
            .yields
            .into_iter()
            .map(|(tenor, value)| {
                let value = zero_if_missing(tenor_value(&value));
                (tenor, value)
            })
            .collect();

        Ok(BondYield { asof, yields })
    }
}

impl<F: IndexFamily> Normalize for IndexRaw<F> {
    type Output = IndexRecord<F>;

    fn normalize(self) -> Result<IndexRecord<F>> {
        let month = self
            .month
            .filter(|m| !m.is_empty())
            .ok_or_else(|| SyncError::InvalidKey {
                family: F::NAME,
                reason: "missing month".to_string(),
            })?;
        let year = self.year.ok_or_else(|| SyncError::InvalidKey {
            family: F::NAME,
            reason: format!("missing year for {}", month),
        })?;

        Ok(IndexRecord::new(
            year,
            month,
            zero_if_missing(self.level),
            zero_if_missing(self.dividend_yield),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Set;
    use serde_json::json;
    use std::marker::PhantomData;

    fn raw(year: Option<i32>, month: Option<&str>, level: Option<f64>) -> IndexRaw<Set> {
        IndexRaw {
            year,
            month: month.map(str::to_string),
            level,
            dividend_yield: None,
            family: PhantomData,
        }
    }

    #[test]
    fn missing_numbers_become_zero() {
        let record = raw(Some(2024), Some("Jan"), None).normalize().unwrap();
        assert_eq!(record.level, 0.0);
        assert_eq!(record.dividend_yield, 0.0);

        let record = raw(Some(2024), Some("Jan"), Some(f64::NAN)).normalize().unwrap();
        assert_eq!(record.level, 0.0);

        let record = raw(Some(2024), Some("Jan"), Some(1400.5)).normalize().unwrap();
        assert_eq!(record.level, 1400.5);
    }

    #[test]
    fn index_keys_are_never_defaulted() {
        assert!(matches!(
            raw(None, Some("Jan"), Some(1.0)).normalize(),
            Err(SyncError::InvalidKey { family: "SET", .. })
        ));
        assert!(matches!(
            raw(Some(2024), None, Some(1.0)).normalize(),
            Err(SyncError::InvalidKey { .. })
        ));
        assert!(matches!(
            raw(Some(2024), Some(""), Some(1.0)).normalize(),
            Err(SyncError::InvalidKey { .. })
        ));
    }

    #[test]
    fn bond_tenors_default_to_zero() {
        let raw: BondYieldRaw = serde_json::from_value(json!({
            "asof": "2024-03-15T00:00:00",
            "ttm1": 2.41,
            "ttm2": "2.50",
            "ttm5": null,
            "ttm10": "n/a"
        }))
        .unwrap();
        let record = raw.normalize().unwrap();
        assert_eq!(record.asof.to_string(), "2024-03-15");
        assert_eq!(record.yields["ttm1"], 2.41);
        assert_eq!(record.yields["ttm2"], 2.5);
        assert_eq!(record.yields["ttm5"], 0.0);
        assert_eq!(record.yields["ttm10"], 0.0);
    }

    #[test]
    fn bond_without_date_is_rejected() {
        let missing: BondYieldRaw = serde_json::from_value(json!({ "ttm1": 2.41 })).unwrap();
        assert!(matches!(missing.normalize(), Err(SyncError::InvalidKey { .. })));

        let null: BondYieldRaw =
            serde_json::from_value(json!({ "asof": null, "ttm1": 2.41 })).unwrap();
        assert!(null.normalize().is_err());

        let garbage: BondYieldRaw =
            serde_json::from_value(json!({ "asof": "yesterday", "ttm1": 2.41 })).unwrap();
        assert!(garbage.normalize().is_err());
    }

    #[test]
    fn normalize_all_stops_at_first_bad_key() {
        let records = vec![
            raw(Some(2024), Some("Jan"), Some(1.0)),
            raw(None, Some("Feb"), Some(2.0)),
        ];
        assert!(normalize_all(records).is_err());
    }
}
