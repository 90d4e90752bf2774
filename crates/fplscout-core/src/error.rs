// Error types for the normalization boundary.

use thiserror::Error;

/// Upstream data that violates the payload contract.
///
/// Sparse optional fields never produce one of these; they are defaulted
/// during normalization instead.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("element {id:?}: missing required field `{field}`")]
    MissingField { id: Option<u32>, field: &'static str },

    #[error("element {id}: unrecognized position code {code}")]
    UnknownPosition { id: u32, code: i64 },

    #[error("element {id}: field `{field}` is not a decimal: {value:?}")]
    InvalidDecimal {
        id: u32,
        field: &'static str,
        value: String,
    },

    #[error("element {id}: negative price {tenths} (tenths)")]
    NegativePrice { id: u32, tenths: i64 },

    #[error("pick for element {element}: slot {slot} outside 1..=15")]
    SlotOutOfRange { element: u32, slot: i64 },

    #[error("unknown position label `{0}` (expected GK, DEF, MID or FWD)")]
    UnknownPositionLabel(String),
}
