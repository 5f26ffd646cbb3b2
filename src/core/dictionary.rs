//! Dictionary line source

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::error::{AttackError, Result};

/// Loaded dictionary entries, in file order
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<String>,
    skipped: usize,
}

impl Dictionary {
    /// Read every line of `path`, trailing whitespace stripped
    pub fn load(path: &Path) -> Result<Self> {
        let read_error = |source| AttackError::DictionaryRead {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(read_error)?;
        Self::from_reader(file).map_err(read_error)
    }

    /// Lines that are not valid UTF-8 are skipped and counted
    pub fn from_reader<R: Read>(reader: R) -> std::io::Result<Self> {
        let mut reader = BufReader::new(reader);
        let mut entries = Vec::new();
        let mut skipped = 0;
        let mut raw = Vec::new();
        let mut line_no = 0usize;

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            line_no += 1;

            match std::str::from_utf8(&raw) {
                Ok(line) => entries.push(line.trim_end().to_string()),
                Err(_) => {
                    log::warn!("Skipping dictionary line {}: not valid UTF-8", line_no);
                    skipped += 1;
                }
            }
        }

        Ok(Self { entries, skipped })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lines dropped because they were not UTF-8
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl From<Vec<String>> for Dictionary {
    fn from(entries: Vec<String>) -> Self {
        Self {
            entries,
            skipped: 0,
        }
    }
}
