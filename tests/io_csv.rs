//! Tabular column extraction.

use anyhow::Result;
use corpus_unify::testing::*;
use corpus_unify::*;
use std::fs;

#[test]
fn row_count_matches_file_exactly() -> Result<()> {
    let fx = CorpusFixture::new()?;
    let rows: Vec<[String; 3]> = (0..500)
        .map(|i| [i.to_string(), "Radiology".to_string(), format!("note {i}, with comma")])
        .collect();
    let rows_ref: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
    let rows_ref: Vec<&[&str]> = rows_ref.iter().map(Vec::as_slice).collect();
    let path = fx.write_csv(&["ROW_ID", "CATEGORY", "TEXT"], &rows_ref)?;

    let batch = extract_column(&path, "TEXT", &CsvOptions::default())?;
    assert_eq!(batch.len(), 500);
    assert_eq!(batch.records()[499].text, "note 499, with comma");
    Ok(())
}

#[test]
fn quoted_newlines_and_quotes_survive() -> Result<()> {
    let fx = CorpusFixture::new()?;
    let path = fx.write_csv(
        &["TEXT"],
        &[&["line one\nline two"], &["she said \"stop\""]],
    )?;
    let batch = extract_column(&path, "TEXT", &CsvOptions::default())?;
    assert_texts_equal(&batch, &["line one\nline two", "she said \"stop\""]);
    Ok(())
}

#[test]
fn header_only_file_is_an_empty_batch() -> Result<()> {
    let fx = CorpusFixture::new()?;
    fs::write(fx.csv_path(), "ROW_ID,TEXT\n")?;
    let batch = extract_column(fx.csv_path(), "TEXT", &CsvOptions::default())?;
    assert!(batch.is_empty());
    assert_eq!(batch.column(), "TEXT");
    Ok(())
}

#[test]
fn invalid_utf8_field_is_fatal() -> Result<()> {
    let fx = CorpusFixture::new()?;
    let mut bytes = b"ID,TEXT\n1,".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe]);
    bytes.push(b'\n');
    fs::write(fx.csv_path(), bytes)?;

    let err = extract_column(fx.csv_path(), "TEXT", &CsvOptions::default()).unwrap_err();
    assert_eq!(exit_code(&err), ErrorKind::Input.exit_code());
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn gzip_input_is_decoded() -> Result<()> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let fx = CorpusFixture::new()?;
    let path = fx.path().join("notes.csv.gz");
    let mut enc = GzEncoder::new(fs::File::create(&path)?, Compression::default());
    enc.write_all(b"ROW_ID,TEXT\n1,x y\n2,z\n")?;
    enc.finish()?;

    let batch = extract_column(&path, "TEXT", &CsvOptions::default())?;
    assert_texts_equal(&batch, &["x y", "z"]);
    Ok(())
}

#[cfg(feature = "compression-zstd")]
#[test]
fn zstd_input_without_extension_is_decoded() -> Result<()> {
    let fx = CorpusFixture::new()?;
    let raw = b"ROW_ID,TEXT\n1,x y\n".to_vec();
    fs::write(fx.csv_path(), zstd::stream::encode_all(raw.as_slice(), 3)?)?;

    let batch = extract_column(fx.csv_path(), "TEXT", &CsvOptions::default())?;
    assert_texts_equal(&batch, &["x y"]);
    Ok(())
}
