//! I/O module
//!
//! The boundary layer between callers and the engine: CSV input and output
//! plus the structural validation a request handler performs.
//!
//! # Components
//!
//! - `csv_format` - Record types, conversion to domain types, output writers
//! - `reader` - Streaming CSV reader with an iterator interface
//! - `validation` - Field-level checks on transfers and new accounts

pub mod csv_format;
pub mod reader;
pub mod validation;

pub use csv_format::{
    convert_account_record, convert_transfer_record, write_accounts_csv, write_outcomes_csv,
    AccountCsvRecord, TransferCsvRecord,
};
pub use reader::RecordReader;
pub use validation::{validate_new_account, validate_transfer};
