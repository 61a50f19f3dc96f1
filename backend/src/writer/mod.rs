//! Chunked JSONL writer.
//!
//! Records are buffered into chunks of at most `chunk_size`. A full chunk is
//! written to a temporary file in the output directory and renamed to
//! `<prefix><index>.jsonl`, so a reader never sees a half-written file. A
//! chunk still buffered when the writer is dropped without [`ChunkWriter::finish`]
//! is discarded.

use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{WriteError, WriteResult};
use crate::logs::log_info_indent;

/// File name of chunk `index`.
pub fn chunk_file_name(prefix: &str, index: usize) -> String {
    format!("{}{}.jsonl", prefix, index)
}

/// Chunk index encoded in `file_name`, if it belongs to this prefix.
pub fn parse_chunk_index(prefix: &str, file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(prefix)?
        .strip_suffix(".jsonl")?
        .parse()
        .ok()
}

/// Write one chunk as JSONL into `dir`, atomically.
pub fn write_jsonl<T: Serialize>(dir: &Path, file_name: &str, records: &[T]) -> WriteResult<PathBuf> {
    let path = dir.join(file_name);
    let mut tmp = NamedTempFile::new_in(dir)?;

    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        for record in records {
            serde_json::to_writer(&mut out, record)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
    }
    tmp.as_file().sync_all()?;

    tmp.persist(&path).map_err(|e| WriteError::Persist {
        path: path.clone(),
        source: e.error,
    })?;

    Ok(path)
}

/// Streaming chunker over an output directory.
pub struct ChunkWriter<T: Serialize> {
    output_dir: PathBuf,
    prefix: String,
    chunk_size: usize,
    buffer: Vec<T>,
    written: Vec<PathBuf>,
}

impl<T: Serialize> ChunkWriter<T> {
    /// Create the output directory (idempotently) and an empty chunker.
    pub fn create(output_dir: impl AsRef<Path>, prefix: impl Into<String>, chunk_size: usize) -> WriteResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        let chunk_size = chunk_size.max(1);

        Ok(Self {
            output_dir,
            prefix: prefix.into(),
            chunk_size,
            buffer: Vec::with_capacity(chunk_size),
            written: Vec::new(),
        })
    }

    /// Buffer a record; writes a file when the chunk fills up.
    pub fn push(&mut self, record: T) -> WriteResult<Option<PathBuf>> {
        self.buffer.push(record);
        if self.buffer.len() >= self.chunk_size {
            return self.flush_chunk().map(Some);
        }
        Ok(None)
    }

    /// Write the final partial chunk, remove leftovers from earlier
    /// larger runs, and return every file written, in index order.
    pub fn finish(mut self) -> WriteResult<Vec<PathBuf>> {
        if !self.buffer.is_empty() {
            self.flush_chunk()?;
        }
        self.remove_stale_chunks()?;
        Ok(self.written)
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn flush_chunk(&mut self) -> WriteResult<PathBuf> {
        let index = self.written.len();
        let name = chunk_file_name(&self.prefix, index);
        let path = write_jsonl(&self.output_dir, &name, &self.buffer)?;

        log_info_indent(format!("{} ({} records)", name, self.buffer.len()), 1);
        self.buffer.clear();
        self.written.push(path.clone());
        Ok(path)
    }

    fn remove_stale_chunks(&self) -> WriteResult<()> {
        let count = self.written.len();
        for entry in fs::read_dir(&self.output_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(index) = parse_chunk_index(&self.prefix, name) {
                if index >= count {
                    fs::remove_file(entry.path())?;
                    tracing::debug!("removed stale chunk {}", name);
                }
            }
        }
        Ok(())
    }
}

/// Write every record in `records`, chunked.
pub fn write_jsonl_chunks<T, I>(
    output_dir: impl AsRef<Path>,
    prefix: &str,
    chunk_size: usize,
    records: I,
) -> WriteResult<Vec<PathBuf>>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = ChunkWriter::create(output_dir, prefix, chunk_size)?;
    for record in records {
        writer.push(record)?;
    }
    writer.finish()
}
