use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

const HEADER: &[u8] = b"{\"type\": \"FeatureCollection\", \"features\": [\n";
const SEPARATOR: &[u8] = b",\n";
const FOOTER: &[u8] = b"\n]}\n";

/// Incremental FeatureCollection writer.
///
/// The header is written on construction, a separator before every feature
/// except the first, and the footer once in [`finish`](Self::finish). Only the
/// feature currently being serialized is held in memory.
pub struct FeatureCollectionWriter<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> FeatureCollectionWriter<W> {
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(HEADER)?;
        Ok(Self { writer, written: 0 })
    }

    pub fn write_feature<F: Serialize>(&mut self, feature: &F) -> Result<()> {
        if self.written > 0 {
            self.writer.write_all(SEPARATOR)?;
        }
        serde_json::to_writer(&mut self.writer, feature)
            .with_context(|| format!("failed to serialize feature {}", self.written))?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Closes the collection and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.write_all(FOOTER)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Writes a FeatureCollection to `path` through `body`.
///
/// Output goes to a temporary file next to `path` and replaces `path` only
/// after `body` and the closing footer both succeed; on error the temporary
/// file is removed and any existing file at `path` is left untouched.
pub fn write_collection<T, F>(path: &Path, body: F) -> Result<T>
where
    F: FnOnce(&mut FeatureCollectionWriter<BufWriter<NamedTempFile>>) -> Result<T>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    let mut writer = FeatureCollectionWriter::new(BufWriter::new(tmp))?;

    let result = body(&mut writer)?;
    let written = writer.written();

    let tmp = writer
        .finish()?
        .into_inner()
        .map_err(|e| e.into_error())
        .context("failed to flush feature collection")?;
    tmp.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    debug!(path = %path.display(), features = written, "Feature collection written");
    Ok(result)
}
