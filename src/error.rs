//! Error types for sqlite-typed

use std::path::PathBuf;

use thiserror::Error;

use crate::ResultCode;

/// Errors raised by the `Result`-returning convenience paths.
///
/// The primitives on [`Connection`](crate::Connection) and
/// [`Statement`](crate::Statement) return a bare [`ResultCode`] instead and
/// never produce this type.
#[derive(Error, Debug)]
pub enum Error {
   /// The engine reported a failure. `message` is the connection's
   /// `sqlite3_errmsg` text captured right after the failing call.
   #[error("{message} ({code})")]
   Sqlite { code: ResultCode, message: String },

   /// The database path could not be passed to the engine as UTF-8.
   #[error("database path is not valid UTF-8: {}", .0.display())]
   InvalidPath(PathBuf),

   /// A path or VFS name contained an interior NUL byte.
   #[error("nul byte in argument: {0}")]
   Nul(#[from] std::ffi::NulError),
}

impl Error {
   pub(crate) fn sqlite(code: ResultCode, message: impl Into<String>) -> Self {
      debug_assert!(code.is_error(), "{} is not an error code", code.name());
      Error::Sqlite {
         code,
         message: message.into(),
      }
   }

   /// The result code behind this error.
   ///
   /// Failures detected before reaching the engine report
   /// [`ResultCode::Misuse`]. The returned code always satisfies
   /// [`ResultCode::is_error`].
   pub fn code(&self) -> ResultCode {
      match self {
         Error::Sqlite { code, .. } => *code,
         Error::InvalidPath(_) | Error::Nul(_) => ResultCode::Misuse,
      }
   }

   /// Extract a structured error code from the error type.
   ///
   /// Engine failures use the C identifier of their code (`SQLITE_BUSY`).
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlite { code, .. } => match code {
            ResultCode::Unknown(raw) => format!("SQLITE_UNKNOWN_{}", raw),
            _ => code.name().to_string(),
         },
         Error::InvalidPath(_) => "INVALID_PATH".to_string(),
         Error::Nul(_) => "NUL_BYTE".to_string(),
      }
   }
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
