//! Transparent decompression for tabular inputs.
//!
//! Large CSV exports are often shipped compressed (`NOTEEVENTS.csv.gz`). The
//! extractor opens its input through [`auto_detect_reader`], which wraps the file
//! in a streaming decoder when one of the built-in codecs recognizes it:
//!
//! | Codec | Extensions | Feature |
//! |-------|------------|---------|
//! | gzip  | `.gz`, `.gzip` | `compression-gzip` |
//! | zstd  | `.zst`, `.zstd` | `compression-zstd` |
//! | bzip2 | `.bz2`, `.bzip2` | `compression-bzip2` |
//! | xz    | `.xz` | `compression-xz` |
//!
//! Detection checks the file extension first and falls back to magic bytes, so
//! a compressed file with a plain `.csv` name is still decoded. When no codec
//! matches, the reader is returned buffered and otherwise untouched.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A streaming decompressor that can be detected from a path or a header.
pub trait DecompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g., "gzip", "zstd").
    fn name(&self) -> &'static str;

    /// Lowercase extensions including the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Leading bytes that identify the format.
    fn magic_bytes(&self) -> &'static [u8];

    /// Wrap `reader` so that reads yield decompressed bytes.
    fn wrap_reader(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>>;
}

/// Codecs compiled into this build, in detection order.
#[must_use]
pub fn builtin_codecs() -> Vec<&'static dyn DecompressionCodec> {
    vec![
        #[cfg(feature = "compression-gzip")]
        &GzipCodec,
        #[cfg(feature = "compression-zstd")]
        &ZstdCodec,
        #[cfg(feature = "compression-bzip2")]
        &Bzip2Codec,
        #[cfg(feature = "compression-xz")]
        &XzCodec,
    ]
}

/// Codec whose extension matches the end of `path`, case-insensitively.
#[must_use]
pub fn detect_from_extension(path: impl AsRef<Path>) -> Option<&'static dyn DecompressionCodec> {
    let name = path.as_ref().to_string_lossy().to_lowercase();
    builtin_codecs()
        .into_iter()
        .find(|c| c.extensions().iter().any(|ext| name.ends_with(ext)))
}

/// Peek at the buffered header without consuming it.
fn detect_from_magic<R: BufRead>(reader: &mut R) -> Option<&'static dyn DecompressionCodec> {
    let buf = reader.fill_buf().ok()?;
    if buf.is_empty() {
        return None;
    }
    builtin_codecs()
        .into_iter()
        .find(|c| buf.starts_with(c.magic_bytes()))
}

/// Wrap `reader` with a decompressor if the path or the content calls for one.
///
/// # Errors
/// Returns an error if the matched codec fails to initialize (for example, a
/// truncated zstd frame header).
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Read>> {
    if let Some(codec) = detect_from_extension(&path_hint) {
        tracing::debug!(codec = codec.name(), "decompressing by extension");
        return codec
            .wrap_reader(Box::new(reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }

    let mut buf_reader = BufReader::new(reader);
    if let Some(codec) = detect_from_magic(&mut buf_reader) {
        tracing::debug!(codec = codec.name(), "decompressing by magic bytes");
        return codec
            .wrap_reader(Box::new(buf_reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }

    Ok(Box::new(buf_reader))
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl DecompressionCodec for GzipCodec {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> &'static [u8] {
        &[0x1f, 0x8b]
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        // Multi-member streams are common for concatenated exports.
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl DecompressionCodec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> &'static [u8] {
        &[0x28, 0xb5, 0x2f, 0xfd]
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read>)
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl DecompressionCodec for Bzip2Codec {
    fn name(&self) -> &'static str {
        "bzip2"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".bz2", ".bzip2"]
    }

    fn magic_bytes(&self) -> &'static [u8] {
        b"BZh"
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl DecompressionCodec for XzCodec {
    fn name(&self) -> &'static str {
        "xz"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".xz"]
    }

    fn magic_bytes(&self) -> &'static [u8] {
        &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)))
    }
}
