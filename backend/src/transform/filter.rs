//! Identifier-format filter.
//!
//! A barcode is kept when it is 8 to 13 characters long and outside the
//! in-store `200` prefix range. Rejected records are excluded silently.

use crate::models::MappedRecord;

pub const MIN_UPC_LEN: usize = 8;
pub const MAX_UPC_LEN: usize = 13;

/// Barcodes starting with this prefix are internal/in-store codes.
pub const RESERVED_PREFIX: &str = "200";

/// Why an identifier was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooShort,
    TooLong,
    ReservedPrefix,
}

/// Check a `mainUPC` value.
pub fn check_upc(upc: &str) -> Result<(), Rejection> {
    let len = upc.chars().count();
    if len < MIN_UPC_LEN {
        return Err(Rejection::TooShort);
    }
    if len > MAX_UPC_LEN {
        return Err(Rejection::TooLong);
    }
    if upc.starts_with(RESERVED_PREFIX) {
        return Err(Rejection::ReservedPrefix);
    }
    Ok(())
}

/// Keep the record only if its identifier passes.
pub fn filter_record(record: MappedRecord) -> Result<MappedRecord, Rejection> {
    check_upc(&record.main_upc).map(|()| record)
}
