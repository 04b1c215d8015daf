use std::{
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::bill::BillRecord;

/// Where scraped records end up. Sinks only ever grow.
pub trait RecordSink {
    fn append(&mut self, record: &BillRecord) -> anyhow::Result<()>;
}

/// Appends one JSON object per line to a file. Existing contents are kept, so
/// running the same range twice writes every record twice.
pub struct JsonLinesSink {
    path: PathBuf,
    file: File,
}

impl JsonLinesSink {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open {} for appending", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonLinesSink {
    fn append(&mut self, record: &BillRecord) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .with_context(|| format!("failed to write to {}", self.path.display()))?;
        Ok(())
    }
}

/// Reads back every record of a JSON Lines file, in file order.
pub fn read_json_lines(path: impl AsRef<Path>) -> anyhow::Result<Vec<BillRecord>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut records = vec![];
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<BillRecord>,
}

impl RecordSink for MemorySink {
    fn append(&mut self, record: &BillRecord) -> anyhow::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn append(&mut self, record: &BillRecord) -> anyhow::Result<()> {
        (**self).append(record)
    }
}
