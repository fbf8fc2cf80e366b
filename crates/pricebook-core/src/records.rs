use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use thiserror::Error;

/// Header written on export. Uploads are expected to carry the same layout,
/// but their header row is never inspected.
pub const HEADER: [&str; 5] = ["id", "name", "category", "price", "create_date"];

// Positional layout of an uploaded row. Column 0 holds a client-side id
// that is never trusted; the store assigns its own.
const NAME_COLUMN: usize = 1;
const CATEGORY_COLUMN: usize = 2;
const PRICE_COLUMN: usize = 3;
const DATE_COLUMN: usize = 4;
const MIN_COLUMNS: usize = 5;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A validated row ready to be inserted into `prices`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub create_date: NaiveDateTime,
}

impl PriceRecord {
    /// Price rendered with exactly two fractional digits.
    pub fn price_text(&self) -> String {
        format_price(self.price)
    }

    /// Creation date rendered as a midnight timestamp for storage.
    pub fn create_date_text(&self) -> String {
        self.create_date.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Category,
    Price,
    CreateDate,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Category => "category",
            Field::Price => "price",
            Field::CreateDate => "create_date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a data row was left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("expected at least 5 columns but found {found}")]
    TooFewColumns { found: usize },

    #[error("{0} is empty")]
    EmptyField(Field),

    #[error("price '{0}' is not a decimal number")]
    InvalidPrice(String),

    #[error("create_date '{0}' is not a YYYY-MM-DD date")]
    InvalidDate(String),

    #[error("row could not be read: {0}")]
    Unreadable(String),
}

/// Map one uploaded data row onto a [`PriceRecord`].
///
/// This is the only place that knows the positional column layout.
pub fn decode_row(row: &StringRecord) -> Result<PriceRecord, SkipReason> {
    if row.len() < MIN_COLUMNS {
        return Err(SkipReason::TooFewColumns { found: row.len() });
    }

    let name = required(row, NAME_COLUMN, Field::Name)?;
    let category = required(row, CATEGORY_COLUMN, Field::Category)?;
    let price_text = required(row, PRICE_COLUMN, Field::Price)?;
    let date_text = required(row, DATE_COLUMN, Field::CreateDate)?;

    let price = parse_price(price_text)?;
    let create_date = parse_date(date_text)?;

    Ok(PriceRecord {
        name: name.to_string(),
        category: category.to_string(),
        price,
        create_date,
    })
}

fn required(row: &StringRecord, index: usize, field: Field) -> Result<&str, SkipReason> {
    match row.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(SkipReason::EmptyField(field)),
    }
}

fn parse_price(text: &str) -> Result<f64, SkipReason> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SkipReason::InvalidPrice(text.to_string())),
    }
}

fn parse_date(text: &str) -> Result<NaiveDateTime, SkipReason> {
    // chrono accepts single-digit months and days and signed years; the
    // length check pins the layout to exactly YYYY-MM-DD.
    if text.len() != 10 {
        return Err(SkipReason::InvalidDate(text.to_string()));
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| SkipReason::InvalidDate(text.to_string()))
}

pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn decodes_a_complete_row_and_ignores_client_id() {
        let record = decode_row(&row(&["42", "Widget", "Tools", "9.99", "2023-01-15"]))
            .expect("row should decode");

        assert_eq!(record.name, "Widget");
        assert_eq!(record.category, "Tools");
        assert!((record.price - 9.99).abs() < f64::EPSILON);
        assert_eq!(record.price_text(), "9.99");
        assert_eq!(record.create_date_text(), "2023-01-15 00:00:00");
    }

    #[test]
    fn extra_columns_are_ignored() {
        let record = decode_row(&row(&["", "Widget", "Tools", "3", "2023-01-15", "extra"]))
            .expect("row should decode");
        assert_eq!(record.price_text(), "3.00");
    }

    #[test]
    fn short_rows_are_skipped() {
        let err = decode_row(&row(&["", "Widget", "Tools", "9.99"])).unwrap_err();
        assert_eq!(err, SkipReason::TooFewColumns { found: 4 });
    }

    #[test]
    fn empty_fields_are_skipped_in_column_order() {
        assert_eq!(
            decode_row(&row(&["", "", "Tools", "9.99", "2023-01-15"])).unwrap_err(),
            SkipReason::EmptyField(Field::Name)
        );
        assert_eq!(
            decode_row(&row(&["", "Widget", "", "", "2023-01-15"])).unwrap_err(),
            SkipReason::EmptyField(Field::Category)
        );
        assert_eq!(
            decode_row(&row(&["", "Widget", "Tools", "", "2023-01-15"])).unwrap_err(),
            SkipReason::EmptyField(Field::Price)
        );
        assert_eq!(
            decode_row(&row(&["", "Widget", "Tools", "9.99", ""])).unwrap_err(),
            SkipReason::EmptyField(Field::CreateDate)
        );
    }

    #[test]
    fn unparseable_prices_are_skipped() {
        for bad in ["notanumber", "9,99", "NaN", "inf", " 9.99", "0x1p-2"] {
            let err = decode_row(&row(&["", "Widget", "Tools", bad, "2023-01-15"])).unwrap_err();
            assert_eq!(err, SkipReason::InvalidPrice(bad.to_string()), "{bad}");
        }
    }

    #[test]
    fn negative_prices_pass_through() {
        let record = decode_row(&row(&["", "Refund", "Tools", "-5.5", "2023-01-15"]))
            .expect("negative prices are left to the store");
        assert_eq!(record.price_text(), "-5.50");
    }

    #[test]
    fn dates_must_match_the_fixed_layout() {
        for bad in ["2023-1-15", "15-01-2023", "2023-02-30", "2023/01/15", "2023-01-15T00:00"] {
            let err = decode_row(&row(&["", "Widget", "Tools", "1", bad])).unwrap_err();
            assert_eq!(err, SkipReason::InvalidDate(bad.to_string()), "{bad}");
        }
    }

    #[test]
    fn prices_round_to_two_places() {
        assert_eq!(format_price(1.005), "1.00");
        assert_eq!(format_price(2.675), "2.67");
        assert_eq!(format_price(10.0), "10.00");
    }
}
