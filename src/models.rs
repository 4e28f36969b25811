// src/models.rs
use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;

/// A normalized record that can be diffed against, and appended to, a store table.
pub trait SyncRecord: Serialize + Send + Sync {
    type Key: PartialEq + Debug + Send + Sync;

    fn key(&self) -> Self::Key;

    /// Reads the natural key back out of a stored row.
    fn key_from_row(row: &Value) -> Result<Self::Key, serde_json::Error>;
}

/// Year + month natural key shared by the index and return tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: String,
}

/// Parses the calendar-date prefix of a ThaiBMA `asof` value ("2024-01-05T00:00:00").
pub fn parse_asof(text: &str) -> Option<NaiveDate> {
    let date = text.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn deserialize_asof<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_asof(&text).ok_or_else(|| serde::de::Error::custom(format!("bad asof date {:?}", text)))
}

// ---------------------------------------------------------------------------
// Bond yields
// ---------------------------------------------------------------------------

/// One yield-curve observation as published by ThaiBMA.
#[derive(Debug, Clone, Deserialize)]
pub struct BondYieldRaw {
    #[serde(default)]
    pub asof: Option<String>,
    /// Every other field of the source object, one per tenor.
    #[serde(flatten)]
    pub yields: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BondYield {
    pub asof: NaiveDate,
    #[serde(flatten)]
    pub yields: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct AsofRow {
    #[serde(deserialize_with = "deserialize_asof")]
    asof: NaiveDate,
}

impl SyncRecord for BondYield {
    type Key = NaiveDate;

    fn key(&self) -> NaiveDate {
        self.asof
    }

    fn key_from_row(row: &Value) -> Result<NaiveDate, serde_json::Error> {
        AsofRow::deserialize(row).map(|r| r.asof)
    }
}

// ---------------------------------------------------------------------------
// Index families
// ---------------------------------------------------------------------------

/// Static description of one index published in the SET statistics tables.
pub trait IndexFamily: Debug + Clone + Send + Sync + 'static {
    const NAME: &'static str;
    const INFO_TABLE: &'static str;
    const RETURN_TABLE: &'static str;
    const INFO_LABEL: &'static str;
    const RETURN_LABEL: &'static str;
    /// Stored column holding the index level.
    const LEVEL_COLUMN: &'static str;
    /// 1-based `td` position of this index in both statistics tables.
    const COLUMN: usize;
    /// Rows at the bottom of the published table that are never read.
    const SKIPPED_TAIL_ROWS: usize;
}

/// Rows at the bottom of the statistics tables that are excluded from the mai series.
pub const MAI_SKIPPED_TAIL_ROWS: usize = 329;

/// SET composite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Set;

/// mai (Market for Alternative Investment) index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mai;

impl IndexFamily for Set {
    const NAME: &'static str = "SET";
    const INFO_TABLE: &'static str = "SET_Info";
    const RETURN_TABLE: &'static str = "SET_Return";
    const INFO_LABEL: &'static str = "Market Index";
    const RETURN_LABEL: &'static str = "Market Return";
    const LEVEL_COLUMN: &'static str = "setindex";
    const COLUMN: usize = 2;
    const SKIPPED_TAIL_ROWS: usize = 0;
}

impl IndexFamily for Mai {
    const NAME: &'static str = "mai";
    const INFO_TABLE: &'static str = "MAI_Info";
    const RETURN_TABLE: &'static str = "MAI_Return";
    const INFO_LABEL: &'static str = "mai Market Index";
    const RETURN_LABEL: &'static str = "mai Market Return";
    const LEVEL_COLUMN: &'static str = "maiindex";
    const COLUMN: usize = 10;
    const SKIPPED_TAIL_ROWS: usize = MAI_SKIPPED_TAIL_ROWS;
}

/// One row of the index table paired with its dividend-yield row, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRaw<F> {
    pub year: Option<i32>,
    pub month: Option<String>,
    pub level: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub family: PhantomData<F>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord<F> {
    pub year: i32,
    pub month: String,
    pub level: f64,
    pub dividend_yield: f64,
    pub family: PhantomData<F>,
}

impl<F: IndexFamily> IndexRecord<F> {
    pub fn new(year: i32, month: impl Into<String>, level: f64, dividend_yield: f64) -> Self {
        IndexRecord {
            year,
            month: month.into(),
            level,
            dividend_yield,
            family: PhantomData,
        }
    }
}

// The level column name differs per family, so the row layout is written by hand.
impl<F: IndexFamily> Serialize for IndexRecord<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("year", &self.year)?;
        map.serialize_entry("month", &self.month)?;
        map.serialize_entry(F::LEVEL_COLUMN, &self.level)?;
        map.serialize_entry("divyield", &self.dividend_yield)?;
        map.end()
    }
}

impl<F: IndexFamily> SyncRecord for IndexRecord<F> {
    type Key = MonthKey;

    fn key(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month: self.month.clone(),
        }
    }

    fn key_from_row(row: &Value) -> Result<MonthKey, serde_json::Error> {
        MonthKey::deserialize(row)
    }
}

/// Monthly and yearly returns derived from an index series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRecord {
    pub year: i32,
    pub month: String,
    pub yearly_return: f64,
    pub monthly_return: f64,
    pub yearly_tri: f64,
    pub monthly_tri: f64,
}

impl SyncRecord for ReturnRecord {
    type Key = MonthKey;

    fn key(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month: self.month.clone(),
        }
    }

    fn key_from_row(row: &Value) -> Result<MonthKey, serde_json::Error> {
        MonthKey::deserialize(row)
    }
}
