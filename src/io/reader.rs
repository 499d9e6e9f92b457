//! Streaming CSV reader with iterator interface
//!
//! Yields deserialized rows one at a time with their line number, so a bad
//! row can be reported and skipped without stopping the load.
//!
//! ```no_run
//! use sharded_ledger::io::csv_format::{convert_transfer_record, TransferCsvRecord};
//! use sharded_ledger::io::reader::RecordReader;
//! use std::path::Path;
//!
//! let reader = RecordReader::<TransferCsvRecord>::open(Path::new("transfers.csv")).unwrap();
//! for row in reader {
//!     match row.and_then(|(_, record)| convert_transfer_record(record)) {
//!         Ok(request) => println!("{}", request),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `open()`
//! - Row-level deserialization errors are yielded as `Err` with the line number

use crate::types::LedgerError;
use csv::{DeserializeRecordsIntoIter, ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Streaming reader over the rows of one CSV file
pub struct RecordReader<T> {
    records: DeserializeRecordsIntoIter<File, T>,
    line_num: u64,
}

impl<T: DeserializeOwned> RecordReader<T> {
    /// Open a CSV file with a header row
    ///
    /// Whitespace around fields is trimmed.
    ///
    /// # Returns
    ///
    /// * `Ok(RecordReader)` if the file opened
    /// * `Err(LedgerError::FileNotFound)` if it does not exist
    /// * `Err(LedgerError::IoError)` for any other open failure
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LedgerError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => LedgerError::from(e),
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        // Line 1 is the header
        Ok(Self {
            records: reader.into_deserialize(),
            line_num: 1,
        })
    }
}

impl<T: DeserializeOwned> Iterator for RecordReader<T> {
    /// `(line, record)` on success; a message naming the line on failure
    type Item = Result<(u64, T), String>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.records.next()?;
        self.line_num += 1;
        let line = self.line_num;

        Some(match result {
            Ok(record) => Ok((line, record)),
            Err(e) => Err(format!("Line {}: {}", line, e)),
        })
    }
}
