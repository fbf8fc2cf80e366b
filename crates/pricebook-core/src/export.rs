use crate::error::ExportError;
use crate::records::{format_price, DATE_FORMAT, HEADER};
use crate::store::StoredPrice;

/// Render stored prices as the `data.csv` payload of an export.
///
/// Prices always carry two fractional digits and dates drop any time of day.
pub fn serialize_table(prices: &[StoredPrice]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for price in prices {
        writer.write_record([
            price.id.to_string(),
            price.name.clone(),
            price.category.clone(),
            format_price(price.price),
            price.create_date.format(DATE_FORMAT).to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))
}
