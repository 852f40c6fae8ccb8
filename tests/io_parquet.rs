//! Parquet persistence: round trip, overwrite, and failure cleanup.

use anyhow::Result;
use corpus_unify::testing::*;
use corpus_unify::*;
use std::fs;

#[test]
fn parquet_roundtrip_preserves_rows_and_column() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("corpus.parquet");
    let data = CorpusBatch::from_texts(
        "text",
        ["a b", "", "multi\nline", "unicode: naïve café 🩻"],
    );

    let n = write_dataset(&data, &path, &ParquetOptions::default())?;
    assert_eq!(n, 4);

    let back = read_dataset(&path)?;
    assert_eq!(back, data);
    Ok(())
}

#[test]
fn every_codec_roundtrips() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let data = CorpusBatch::from_texts("text", (0..50).map(|i| format!("row {i} ").repeat(i)));
    let codecs = [
        (ParquetCompression::Uncompressed, None),
        (ParquetCompression::Snappy, None),
        (ParquetCompression::Gzip, Some(6)),
        (ParquetCompression::Lz4, None),
        (ParquetCompression::Zstd, Some(19)),
        (ParquetCompression::Brotli, Some(5)),
    ];
    for (compression, level) in codecs {
        let path = tmp.path().join(format!("{compression}.parquet"));
        let opts = ParquetOptions {
            compression,
            level,
            ..ParquetOptions::default()
        };
        write_dataset(&data, &path, &opts)?;
        assert_eq!(read_dataset(&path)?, data, "codec {compression}");
    }
    Ok(())
}

#[test]
fn existing_output_is_replaced() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("corpus.parquet");
    fs::write(&path, b"stale bytes from an earlier run")?;

    write_dataset(&CorpusBatch::from_texts("text", ["fresh"]), &path, &ParquetOptions::default())?;
    assert_texts_equal(&read_dataset(&path)?, &["fresh"]);
    Ok(())
}

#[test]
fn parent_directories_are_created() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("a/b/c/corpus.parquet");
    write_dataset(&CorpusBatch::from_texts("text", ["x"]), &path, &ParquetOptions::default())?;
    assert!(path.is_file());
    Ok(())
}

#[test]
fn bad_level_leaves_previous_output_untouched() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("corpus.parquet");
    write_dataset(&CorpusBatch::from_texts("text", ["v1"]), &path, &ParquetOptions::default())?;

    let opts = ParquetOptions {
        level: Some(42),
        ..ParquetOptions::default()
    };
    let err = write_dataset(&CorpusBatch::from_texts("text", ["v2"]), &path, &opts).unwrap_err();
    assert_eq!(exit_code(&err), ErrorKind::Config.exit_code());
    assert_texts_equal(&read_dataset(&path)?, &["v1"]);
    Ok(())
}

#[test]
fn failed_replace_leaves_no_temporary_files() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    // A directory where the output file should go makes the final rename fail.
    let path = tmp.path().join("corpus.parquet");
    fs::create_dir(&path)?;
    fs::write(path.join("keep"), b"x")?;

    let err = write_dataset(&CorpusBatch::from_texts("text", ["x"]), &path, &ParquetOptions::default())
        .unwrap_err();
    assert_eq!(exit_code(&err), ErrorKind::Write.exit_code());

    let entries: Vec<_> = fs::read_dir(tmp.path())?.collect::<std::io::Result<_>>()?;
    assert_eq!(entries.len(), 1, "temporary file was not cleaned up");
    Ok(())
}

#[test]
fn multi_column_file_is_a_schema_error() -> Result<()> {
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;

    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("wide.parquet");
    let rb = RecordBatch::try_from_iter(vec![
        ("text", Arc::new(StringArray::from(vec!["a"])) as ArrayRef),
        ("id", Arc::new(Int64Array::from(vec![1])) as ArrayRef),
    ])?;
    let mut w = ArrowWriter::try_new(fs::File::create(&path)?, rb.schema(), None)?;
    w.write(&rb)?;
    w.close()?;

    let err = read_dataset(&path).unwrap_err();
    assert_eq!(exit_code(&err), ErrorKind::Schema.exit_code());
    Ok(())
}

#[cfg(unix)]
#[test]
fn output_mode_matches_a_plainly_created_file() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir()?;
    let plain = tmp.path().join("plain");
    fs::File::create(&plain)?;
    let expected = fs::metadata(&plain)?.permissions().mode() & 0o777;

    let path = tmp.path().join("corpus.parquet");
    write_dataset(&CorpusBatch::from_texts("text", ["x"]), &path, &ParquetOptions::default())?;
    let actual = fs::metadata(&path)?.permissions().mode() & 0o777;
    assert_eq!(actual, expected, "output mode {actual:o}, expected {expected:o}");
    Ok(())
}
