use crate::domain::ports::Storage;
use crate::domain::row::DetailRow;
use crate::utils::error::{MigrationError, Result};

/// 依列型別的欄位標題與儲存格產生 CSV
pub fn rows_to_csv<'a, R, I>(rows: I) -> Result<Vec<u8>>
where
    R: DetailRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(R::headers())?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer
        .into_inner()
        .map_err(|e| MigrationError::IoError(e.into_error()))
}

/// 寫入 `path` 並回傳筆數
pub async fn export_rows<'a, R, I, S>(storage: &S, path: &str, rows: I) -> Result<usize>
where
    R: DetailRow + 'a,
    I: IntoIterator<Item = &'a R>,
    S: Storage,
{
    let rows: Vec<&R> = rows.into_iter().collect();
    let count = rows.len();
    let data = rows_to_csv(rows)?;
    storage.write_file(path, &data).await?;
    tracing::info!("📁 Exported {} {} rows to {}", count, R::PHASE, path);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AssignmentDetail;

    fn assignment(guid: &str, status: &str) -> AssignmentDetail {
        AssignmentDetail {
            transaction_guid: guid.to_string(),
            correspondence_guid: "DOC-1".to_string(),
            migrate_status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_csv_has_header_and_one_line_per_row() {
        let rows = vec![assignment("TX-1", "COMPLETED"), assignment("TX-2", "FAILED")];
        let data = rows_to_csv(&rows).unwrap();
        let text = String::from_utf8(data).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0].split(',').count(),
            AssignmentDetail::headers().len()
        );
        assert!(lines[1].starts_with("TX-1,"));
        assert!(lines[2].contains("FAILED"));
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let rows: Vec<AssignmentDetail> = Vec::new();
        let text = String::from_utf8(rows_to_csv(&rows).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
