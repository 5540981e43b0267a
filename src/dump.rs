//! Diagnostic snapshots of tracker internals.
//!
//! A [`DumpSink`] receives named row-major matrices (window, response,
//! filter). Sinks never feed back into tracking; their failures are reported
//! to the caller of `dump` only.

use crate::util::MosseResult;
use std::io::Write;

#[cfg(feature = "image-io")]
use std::path::PathBuf;

/// Destination for named matrices written by `Tracker::dump`.
pub trait DumpSink {
    /// Writes one `width x height` matrix.
    fn write_matrix(
        &mut self,
        name: &str,
        data: &[f64],
        width: usize,
        height: usize,
    ) -> MosseResult<()>;

    /// Called once after every matrix of a snapshot has been written.
    fn finish(&mut self) -> MosseResult<()> {
        Ok(())
    }
}

/// Plaintext sink: a `# name width height` header followed by one line per row.
pub struct TextSink<W: Write> {
    writer: W,
    precision: usize,
}

impl<W: Write> TextSink<W> {
    /// Creates a sink writing values with six decimals.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            precision: 6,
        }
    }

    /// Sets the number of decimals per value.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DumpSink for TextSink<W> {
    fn write_matrix(
        &mut self,
        name: &str,
        data: &[f64],
        width: usize,
        height: usize,
    ) -> MosseResult<()> {
        writeln!(self.writer, "# {name} {width} {height}")?;
        for row in data.chunks(width.max(1)).take(height) {
            let mut first = true;
            for v in row {
                if !first {
                    write!(self.writer, " ")?;
                }
                first = false;
                write!(self.writer, "{:.*}", self.precision, v)?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> MosseResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Image sink writing each matrix as a min-max normalized 8-bit PNG.
///
/// Files are named `{prefix}{index:04}_{name}.png`; the index advances on
/// every finished snapshot.
#[cfg(feature = "image-io")]
pub struct PngSink {
    dir: PathBuf,
    prefix: String,
    index: usize,
}

#[cfg(feature = "image-io")]
impl PngSink {
    /// Creates a sink writing into `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            index: 0,
        }
    }

    /// Index of the next snapshot.
    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(feature = "image-io")]
impl DumpSink for PngSink {
    fn write_matrix(
        &mut self,
        name: &str,
        data: &[f64],
        width: usize,
        height: usize,
    ) -> MosseResult<()> {
        let path = self
            .dir
            .join(format!("{}{:04}_{}.png", self.prefix, self.index, name));
        crate::image::io::save_gray_image(path, &normalize_to_u8(data), width, height)
    }

    fn finish(&mut self) -> MosseResult<()> {
        self.index += 1;
        Ok(())
    }
}

/// Maps finite values linearly onto `[0, 255]`; constant or non-finite input maps to 0.
pub fn normalize_to_u8(data: &[f64]) -> Vec<u8> {
    let (lo, hi) = data
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;
    data.iter()
        .map(|&v| {
            if !v.is_finite() || !(range > 0.0) {
                0
            } else {
                (((v - lo) / range) * 255.0).round() as u8
            }
        })
        .collect()
}
