// src/transform/vehicle.rs

use tracing::debug;

use super::{render_rows, render_scalar, Table};
use crate::error::Error;
use crate::fetch::vehicle::RawRecord;

/// Turn a batch of vehicle records into a table with a header line.
///
/// The header is the key set of the first record, in its original order.
/// Every later record must carry exactly the same keys (in any order) or
/// the batch is rejected with [`Error::SchemaMismatch`]; values are always
/// written in header order.
///
/// Returns `None` for an empty batch: there is nothing to persist.
pub fn to_table(records: &[RawRecord]) -> Result<Option<Table>, Error> {
    let Some(first) = records.first() else {
        return Ok(None);
    };
    let header: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut rows = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let matches =
            record.len() == header.len() && header.iter().all(|k| record.contains_key(*k));
        if !matches {
            return Err(Error::SchemaMismatch {
                index,
                expected: header.join(","),
                found: record.keys().map(String::as_str).collect::<Vec<_>>().join(","),
            });
        }
        rows.push(
            header
                .iter()
                .map(|k| render_scalar(&record[*k]))
                .collect::<Vec<_>>(),
        );
    }

    let text = render_rows(Some(&header[..]), rows)?;
    debug!(columns = header.len(), rows = records.len(), "vehicle table rendered");
    Ok(Some(Table::from_text(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureKind;
    use serde_json::{json, Value};

    fn records(value: Value) -> Vec<RawRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_record() -> anyhow::Result<()> {
        let table = to_table(&records(json!([{"id": "1", "lat": "50.1"}])))?.unwrap();
        assert_eq!(table.as_str(), "id,lat\n1,50.1\n");
        Ok(())
    }

    #[test]
    fn test_empty_batch_is_nothing_to_persist() -> anyhow::Result<()> {
        assert!(to_table(&[])?.is_none());
        Ok(())
    }

    #[test]
    fn test_line_count_and_header_order() -> anyhow::Result<()> {
        let batch = records(json!([
            {"Vehicle_No": 7, "Lines": "A", "GPSLatitude": 51.11, "GPSLongitude": 17.02, "Course": null},
            {"Vehicle_No": 8, "Lines": "31", "GPSLatitude": 51.09, "GPSLongitude": 17.05, "Course": 90},
            {"Vehicle_No": 9, "Lines": "D", "GPSLatitude": 51.13, "GPSLongitude": 16.98, "Course": 180}
        ]));
        let table = to_table(&batch)?.unwrap();
        assert_eq!(table.line_count(), batch.len() + 1);

        let (header, rows) = table.parse()?;
        assert_eq!(
            header,
            vec!["Vehicle_No", "Lines", "GPSLatitude", "GPSLongitude", "Course"]
        );
        assert_eq!(rows[0], vec!["7", "A", "51.11", "17.02", ""]);
        assert_eq!(rows[2], vec!["9", "D", "51.13", "16.98", "180"]);
        Ok(())
    }

    #[test]
    fn test_reordered_keys_follow_header() -> anyhow::Result<()> {
        let batch = records(json!([
            {"id": "1", "lat": "50.1"},
            {"lat": "50.2", "id": "2"}
        ]));
        let table = to_table(&batch)?.unwrap();
        assert_eq!(table.as_str(), "id,lat\n1,50.1\n2,50.2\n");
        Ok(())
    }

    #[test]
    fn test_mismatched_record_is_rejected() {
        let extra = records(json!([
            {"id": "1", "lat": "50.1"},
            {"id": "2", "lat": "50.2", "lon": "17.0"}
        ]));
        let err = to_table(&extra).unwrap_err();
        assert_eq!(err.kind(), FailureKind::SchemaMismatch);
        assert!(err.to_string().contains("record 1"));

        let missing = records(json!([
            {"id": "1", "lat": "50.1"},
            {"id": "2", "lat": "50.2"},
            {"id": "3"}
        ]));
        let err = to_table(&missing).unwrap_err();
        assert!(err.to_string().contains("record 2"));
    }

    #[test]
    fn test_round_trip_preserves_values() -> anyhow::Result<()> {
        let batch = records(json!([
            {"stop": "Plac Grunwaldzki", "delay": -30, "note": "detour, via Most"},
            {"stop": "Rynek", "delay": 0, "note": ""}
        ]));
        let table = to_table(&batch)?.unwrap();
        let (header, rows) = table.parse()?;

        for (record, row) in batch.iter().zip(rows) {
            let expected: Vec<String> = header.iter().map(|k| render_scalar(&record[k])).collect();
            assert_eq!(row, expected);
        }
        Ok(())
    }
}
