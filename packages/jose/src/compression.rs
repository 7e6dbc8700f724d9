//! JWE payload compression (`zip` header parameter)

use crate::error::{JoseError, JoseResult};
use flate2::read::{DeflateDecoder, GzDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use std::fmt::Debug;
use std::io::{Read, Write};

/// Default ceiling on decompressed payload size, in bytes.
pub const DEFAULT_MAX_DECOMPRESSED_LEN: usize = 256 * 1024;

/// A named, reversible payload codec.
pub trait CompressionCodec: Send + Sync + Debug {
    /// Value written to the `zip` header parameter.
    fn id(&self) -> &'static str;

    /// Compress `data`.
    fn compress(&self, data: &[u8]) -> JoseResult<Vec<u8>>;

    /// Reverse [`compress`](Self::compress), failing once the output would
    /// exceed `max_len` bytes.
    fn decompress_limited(&self, data: &[u8], max_len: usize) -> JoseResult<Vec<u8>>;

    /// [`decompress_limited`](Self::decompress_limited) with
    /// [`DEFAULT_MAX_DECOMPRESSED_LEN`].
    fn decompress(&self, data: &[u8]) -> JoseResult<Vec<u8>> {
        self.decompress_limited(data, DEFAULT_MAX_DECOMPRESSED_LEN)
    }
}

fn read_limited(reader: impl Read, max_len: usize, id: &str) -> JoseResult<Vec<u8>> {
    let mut out = Vec::new();
    reader
        .take(max_len as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|err| JoseError::Compression(format!("{id}: {err}")))?;
    if out.len() > max_len {
        return Err(JoseError::Compression(format!(
            "{id}: decompressed payload exceeds {max_len} bytes"
        )));
    }
    Ok(out)
}

/// Raw DEFLATE (RFC 1951), registered as `"DEF"` by RFC 7516.
#[derive(Clone, Copy, Debug)]
pub struct DeflateCodec {
    level: u32,
}

impl DeflateCodec {
    /// Codec at the given level (0-9).
    #[must_use]
    pub const fn new(level: u32) -> Self {
        Self { level }
    }
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self::new(6)
    }
}

impl CompressionCodec for DeflateCodec {
    fn id(&self) -> &'static str {
        "DEF"
    }

    fn compress(&self, data: &[u8]) -> JoseResult<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn decompress_limited(&self, data: &[u8], max_len: usize) -> JoseResult<Vec<u8>> {
        read_limited(DeflateDecoder::new(data), max_len, self.id())
    }
}

/// Gzip framing (RFC 1952), `"GZIP"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GzipCodec;

impl CompressionCodec for GzipCodec {
    fn id(&self) -> &'static str {
        "GZIP"
    }

    fn compress(&self, data: &[u8]) -> JoseResult<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn decompress_limited(&self, data: &[u8], max_len: usize) -> JoseResult<Vec<u8>> {
        read_limited(GzDecoder::new(data), max_len, self.id())
    }
}

/// Registered `DEF` codec.
pub static DEF: DeflateCodec = DeflateCodec::new(6);

/// `GZIP` codec.
pub static GZIP: GzipCodec = GzipCodec;

/// Codec for a `zip` header value.
pub fn compression_codec(id: &str) -> JoseResult<&'static dyn CompressionCodec> {
    match id {
        "DEF" => Ok(&DEF),
        "GZIP" => Ok(&GZIP),
        other => Err(JoseError::unsupported_algorithm(format!(
            "Unsupported compression algorithm '{other}'"
        ))),
    }
}
