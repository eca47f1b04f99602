//! # sqlite-result-codes
//!
//! The status codes returned by every SQLite C interface, as one closed Rust
//! enum with the engine's classification rules attached.
//!
//! ## Core Types
//!
//! - **[`ResultCode`]**: primary codes (`SQLITE_BUSY`), extended codes that
//!   refine them (`SQLITE_BUSY_SNAPSHOT`) and an `Unknown` catch-all
//!
//! ## Classification
//!
//! - [`is_error`] / [`is_non_error`]: `Ok`, `Row`, `Done` and the `Ok*`
//!   informational codes are non-errors, everything else (`Unknown`
//!   included) is an error
//! - [`primary_result`]: strips the extended refinement (`code & 0xff`)
//! - [`errstr`]: the engine's static English description of a code
//!
//! ```
//! use sqlite_result_codes::{ResultCode, is_error, primary_result};
//!
//! let code = ResultCode::from_raw(513);
//! assert_eq!(code, ResultCode::ErrorRetry);
//! assert_eq!(primary_result(code), ResultCode::Error);
//! assert!(is_error(code));
//! ```

mod code;

pub use code::{PRIMARY_MASK, ResultCode};

/// Returns `true` if `code` reports a failure.
pub fn is_error(code: ResultCode) -> bool {
   code.is_error()
}

/// Returns `true` if `code` is `Ok`, `Row`, `Done` or an `Ok*` variant.
pub fn is_non_error(code: ResultCode) -> bool {
   code.is_non_error()
}

/// Returns the primary code an extended code refines.
///
/// Primary codes map to themselves.
pub fn primary_result(code: ResultCode) -> ResultCode {
   code.primary()
}

/// Returns the engine's description of `code`.
pub fn errstr(code: ResultCode) -> &'static str {
   code.errstr()
}
