//! # sqlite-typed
//!
//! Owned handles and typed binding over the SQLite C API.
//!
//! ## Core Types
//!
//! - **[`Connection`]**: owns one database handle, closed on drop
//! - **[`Statement`]**: owns one prepared statement, finalized on drop, and
//!   borrows the connection that prepared it
//! - **[`Parameter`]**: a statement and a 1-based slot, the target of binding
//! - **[`Columns`]**: a cursor reading typed values from the current row
//! - **[`ResultCode`]**: every status code the engine returns
//! - **[`Error`]**: the failure type of the `Result`-returning entry points
//!
//! ## Conventions
//!
//! - **Two calling styles**: primitives return the engine's [`ResultCode`]
//!   as-is ([`Connection::prepare`], [`Statement::step`]). A few convenience
//!   entry points ([`Connection::open`], [`Statement::new`],
//!   [`Statement::try_step`], [`Connection::execute_batch`]) turn error codes
//!   into [`Error`]. Both go through the same code path.
//! - **Static dispatch**: [`Bind`] and [`FromColumn`] map each Rust type to
//!   exactly one primitive. See the [`bind`](mod@bind) and [`column`](mod@column)
//!   module docs for the tables.
//! - **No local range checks**: slot and column indexes go straight to the
//!   engine, which reports bad slots as `Range` and reads bad columns as NULL.
//!
//! ```
//! use sqlite_typed::{Connection, Null, Statement, bind, row};
//!
//! let db = Connection::open_memory()?;
//! db.execute_batch("CREATE TABLE item(id INTEGER, name TEXT, price REAL)")?;
//!
//! let mut insert = Statement::new(&db, "INSERT INTO item VALUES (?, ?, ?)")?;
//! let (code, last) = bind(&insert, &(1, "apple", Null));
//! assert!(!code.is_error());
//! assert_eq!(last, 3);
//! assert!(!insert.try_step()?);
//!
//! let mut select = Statement::new(&db, "SELECT id, name, price FROM item")?;
//! assert!(select.try_step()?);
//! let (id, name, price): (i64, String, Option<f64>) = row(&select);
//! assert_eq!((id, name.as_str(), price), (1, "apple", None));
//! # Ok::<(), sqlite_typed::Error>(())
//! ```

use std::ffi::CStr;

use libsqlite3_sys as ffi;

pub mod bind;
pub mod column;
mod config;
mod connection;
mod error;
mod handle;
mod parameter;
mod statement;
mod value;

// Re-export public types
pub use bind::{Bind, BindValues, bind};
pub use column::{Columns, FromColumn, FromRow, column, row};
pub use config::{OpenConfig, OpenFlags, OpenMode, PrepareFlags, Threading};
pub use connection::Connection;
pub use error::{Error, Result};
pub use handle::{DatabaseKind, HandleKind, OwnedHandle, StatementKind};
pub use parameter::Parameter;
pub use sqlite_result_codes::{
   PRIMARY_MASK, ResultCode, errstr, is_error, is_non_error, primary_result,
};
pub use statement::Statement;
pub use value::{Blob, Datatype, Null, Plain, Skip, Text};

/// The version string of the linked SQLite library, e.g. `3.46.0`.
pub fn version() -> &'static str {
   // SAFETY: the engine returns a pointer to a static NUL-terminated string.
   unsafe { CStr::from_ptr(ffi::sqlite3_libversion()) }
      .to_str()
      .unwrap_or_default()
}

/// The version of the linked SQLite library as `X * 1_000_000 + Y * 1_000 + Z`.
pub fn version_number() -> i32 {
   // SAFETY: no preconditions.
   unsafe { ffi::sqlite3_libversion_number() }
}
