use std::io;

use crate::error::{AnalyticsError, Result};
use crate::export::SheetRow;

/// Serialize rows into a CSV byte buffer with a header record.
pub fn write_csv<R: SheetRow>(rows: &[R]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(R::HEADERS)?;

    for row in rows {
        let fields: Vec<String> = row.cells().iter().map(|c| c.to_text()).collect();
        writer.write_record(&fields)?;
    }

    writer
        .into_inner()
        .map_err(|e| AnalyticsError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))
}
