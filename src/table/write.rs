// src/table/write.rs

use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};
use tracing::info;

use crate::config::OutputFormat;
use crate::error::Result;

/// Run `write` against `tmp_path`, then rename it over `path`.
/// On failure the temporary file is removed.
fn write_atomically(
    tmp_path: &Path,
    path: &Path,
    write: impl FnOnce(File) -> Result<()>,
) -> Result<()> {
    let result = File::create(tmp_path)
        .map_err(Into::into)
        .and_then(write)
        .and_then(|()| fs::rename(tmp_path, path).map_err(Into::into));
    if result.is_err() {
        let _ = fs::remove_file(tmp_path);
    }
    result
}

/// Write `batch` to `path` as Snappy-compressed Parquet.
/// Goes through a `.tmp` sibling and a rename, so readers never see a half file.
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let tmp_path = path.with_extension("parquet.tmp");
    write_atomically(&tmp_path, path, |file| {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;
        Ok(())
    })?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(())
}

/// Write `batch` to `path` as CSV with a header row; nulls become empty cells.
pub fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    let tmp_path = path.with_extension("csv.tmp");
    write_atomically(&tmp_path, path, |file| {
        let mut writer = WriterBuilder::new().with_header(true).build(file);
        writer.write(batch)?;
        Ok(())
    })?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote csv");
    Ok(())
}

/// `<prefix>_<jur>_<YYYYMMDD>`, dated in UTC.
pub fn output_stem(prefix: &str, jur: u32) -> String {
    format!("{}_{}_{}", prefix, jur, Utc::now().format("%Y%m%d"))
}

/// Write `batch` into `dir` as `<stem>.csv` and/or `<stem>.parquet`, creating
/// `dir` if needed. Returns the paths written.
pub fn write_outputs(
    batch: &RecordBatch,
    dir: &Path,
    stem: &str,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    if format.csv() {
        let path = dir.join(format!("{}.csv", stem));
        write_csv(batch, &path)?;
        written.push(path);
    }
    if format.parquet() {
        let path = dir.join(format!("{}.parquet", stem));
        write_parquet(batch, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{OutputTable, PropertyRow, ScrapedFields};
    use arrow::array::{ArrayRef, ListArray};
    use arrow::datatypes::Int32Type;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn sample() -> RecordBatch {
        let mut fields = ScrapedFields::default();
        fields.insert("lblTotalAssessedLand", Some("$52,000".into()));
        fields.insert("lblComments", None);
        let mut table = OutputTable::new();
        table.push(PropertyRow { jur: 226, roll: "00012345".into(), fields });
        table.to_record_batch().unwrap()
    }

    #[test]
    fn csv_has_header_and_empty_nulls() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        write_csv(&sample(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("jur,roll,lblTotalAssessedLand,lblComments"));
        assert_eq!(lines.next(), Some("226,00012345,\"$52,000\","));
        assert!(!tmp.path().join("out.csv.tmp").exists());
    }

    #[test]
    fn parquet_reads_back() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out.parquet");
        let batch = sample();
        write_parquet(&batch, &path).unwrap();

        let file = File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 1);
        assert_eq!(batches[0].schema().fields().len(), batch.num_columns());
    }

    #[test]
    fn write_outputs_honours_format() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("nested");
        let batch = sample();

        let only_csv = write_outputs(&batch, &dir, "a", OutputFormat::Csv).unwrap();
        assert_eq!(only_csv, vec![dir.join("a.csv")]);

        let both = write_outputs(&batch, &dir, "b", OutputFormat::Both).unwrap();
        assert_eq!(both, vec![dir.join("b.csv"), dir.join("b.parquet")]);
        assert!(both.iter().all(|p| p.exists()));
    }

    #[test]
    fn stem_is_prefix_jur_date() {
        let stem = output_stem("bca", 226);
        assert!(stem.starts_with("bca_226_"));
        assert_eq!(stem.len(), "bca_226_".len() + 8);
    }

    #[test]
    fn failed_csv_write_leaves_no_tmp_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested.csv");
        // CSV has no representation for list columns
        let list = ListArray::from_iter_primitive::<Int32Type, _, _>(vec![Some(vec![Some(1)])]);
        let batch =
            RecordBatch::try_from_iter(vec![("values", Arc::new(list) as ArrayRef)]).unwrap();

        assert!(write_csv(&batch, &path).is_err());
        assert!(!path.exists());
        assert!(!tmp.path().join("nested.csv.tmp").exists());
    }

    #[test]
    fn rename_failure_cleans_up() {
        let tmp = tempdir().unwrap();
        // the destination is an existing non-empty directory, so the rename fails
        let path = tmp.path().join("out.parquet");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        assert!(write_parquet(&sample(), &path).is_err());
        assert!(!tmp.path().join("out.parquet.tmp").exists());
    }
}
