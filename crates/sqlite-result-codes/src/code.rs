//! The result code table.
//!
//! Values match <https://www.sqlite.org/rescode.html>. An extended code is
//! `primary | (n << 8)`, so the primary code is always the low byte.

use std::ffi::{CStr, c_int};
use std::fmt;

use libsqlite3_sys as ffi;

/// Mask selecting the primary code out of an extended result code.
pub const PRIMARY_MASK: c_int = 0xff;

const UNKNOWN_ERROR: &str = "unknown error";

macro_rules! result_codes {
   ($(
      $(#[$meta:meta])*
      $variant:ident = $value:literal => $name:literal,
   )*) => {
      /// A SQLite result code.
      ///
      /// Every primary and documented extended code has its own variant.
      /// Values outside the table are kept as [`ResultCode::Unknown`] rather
      /// than rejected, and always classify as errors.
      #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
      pub enum ResultCode {
         $(
            $(#[$meta])*
            $variant,
         )*
         /// A value with no entry in the table.
         Unknown(c_int),
      }

      impl ResultCode {
         /// Every named code, in table order.
         pub const ALL: &'static [ResultCode] = &[$(ResultCode::$variant,)*];

         /// Looks up the variant for an integer returned by the engine.
         pub const fn from_raw(raw: c_int) -> Self {
            match raw {
               $($value => ResultCode::$variant,)*
               other => ResultCode::Unknown(other),
            }
         }

         /// The integer value the engine uses for this code.
         pub const fn raw(self) -> c_int {
            match self {
               $(ResultCode::$variant => $value,)*
               ResultCode::Unknown(raw) => raw,
            }
         }

         /// The C identifier of this code, e.g. `SQLITE_IOERR_READ`.
         pub const fn name(self) -> &'static str {
            match self {
               $(ResultCode::$variant => $name,)*
               ResultCode::Unknown(_) => "SQLITE_UNKNOWN",
            }
         }
      }
   };
}

result_codes! {
   /// Successful result.
   Ok = 0 => "SQLITE_OK",
   /// Generic error.
   Error = 1 => "SQLITE_ERROR",
   /// Internal logic error in SQLite.
   Internal = 2 => "SQLITE_INTERNAL",
   /// Access permission denied.
   Perm = 3 => "SQLITE_PERM",
   /// Callback routine requested an abort.
   Abort = 4 => "SQLITE_ABORT",
   /// The database file is locked.
   Busy = 5 => "SQLITE_BUSY",
   /// A table in the database is locked.
   Locked = 6 => "SQLITE_LOCKED",
   /// A `malloc()` failed.
   NoMem = 7 => "SQLITE_NOMEM",
   /// Attempt to write a readonly database.
   ReadOnly = 8 => "SQLITE_READONLY",
   /// Operation terminated by `sqlite3_interrupt()`.
   Interrupt = 9 => "SQLITE_INTERRUPT",
   /// Some kind of disk I/O error occurred.
   IoErr = 10 => "SQLITE_IOERR",
   /// The database disk image is malformed.
   Corrupt = 11 => "SQLITE_CORRUPT",
   /// Unknown opcode in `sqlite3_file_control()`.
   NotFound = 12 => "SQLITE_NOTFOUND",
   /// Insertion failed because the database is full.
   Full = 13 => "SQLITE_FULL",
   /// Unable to open the database file.
   CantOpen = 14 => "SQLITE_CANTOPEN",
   /// Database lock protocol error.
   Protocol = 15 => "SQLITE_PROTOCOL",
   /// Internal use only.
   Empty = 16 => "SQLITE_EMPTY",
   /// The database schema changed.
   Schema = 17 => "SQLITE_SCHEMA",
   /// String or BLOB exceeds size limit.
   TooBig = 18 => "SQLITE_TOOBIG",
   /// Abort due to constraint violation.
   Constraint = 19 => "SQLITE_CONSTRAINT",
   /// Data type mismatch.
   Mismatch = 20 => "SQLITE_MISMATCH",
   /// Library used incorrectly.
   Misuse = 21 => "SQLITE_MISUSE",
   /// Uses OS features not supported on host.
   NoLfs = 22 => "SQLITE_NOLFS",
   /// Authorization denied.
   Auth = 23 => "SQLITE_AUTH",
   /// Not used.
   Format = 24 => "SQLITE_FORMAT",
   /// Bind parameter or column index out of range.
   Range = 25 => "SQLITE_RANGE",
   /// File opened that is not a database file.
   NotADb = 26 => "SQLITE_NOTADB",
   /// Notification from `sqlite3_log()`.
   Notice = 27 => "SQLITE_NOTICE",
   /// Warning from `sqlite3_log()`.
   Warning = 28 => "SQLITE_WARNING",
   /// `sqlite3_step()` has another row ready.
   Row = 100 => "SQLITE_ROW",
   /// `sqlite3_step()` has finished executing.
   Done = 101 => "SQLITE_DONE",

   // ─── Extended: ok ───
   OkLoadPermanently = 256 => "SQLITE_OK_LOAD_PERMANENTLY",
   OkSymlink = 512 => "SQLITE_OK_SYMLINK",

   // ─── Extended: error ───
   ErrorMissingCollSeq = 257 => "SQLITE_ERROR_MISSING_COLLSEQ",
   ErrorRetry = 513 => "SQLITE_ERROR_RETRY",
   ErrorSnapshot = 769 => "SQLITE_ERROR_SNAPSHOT",

   // ─── Extended: abort, busy, locked ───
   AbortRollback = 516 => "SQLITE_ABORT_ROLLBACK",
   BusyRecovery = 261 => "SQLITE_BUSY_RECOVERY",
   BusySnapshot = 517 => "SQLITE_BUSY_SNAPSHOT",
   BusyTimeout = 773 => "SQLITE_BUSY_TIMEOUT",
   LockedSharedCache = 262 => "SQLITE_LOCKED_SHAREDCACHE",
   LockedVtab = 518 => "SQLITE_LOCKED_VTAB",

   // ─── Extended: readonly ───
   ReadOnlyRecovery = 264 => "SQLITE_READONLY_RECOVERY",
   ReadOnlyCantLock = 520 => "SQLITE_READONLY_CANTLOCK",
   ReadOnlyRollback = 776 => "SQLITE_READONLY_ROLLBACK",
   ReadOnlyDbMoved = 1032 => "SQLITE_READONLY_DBMOVED",
   ReadOnlyCantInit = 1288 => "SQLITE_READONLY_CANTINIT",
   ReadOnlyDirectory = 1544 => "SQLITE_READONLY_DIRECTORY",

   // ─── Extended: ioerr ───
   IoErrRead = 266 => "SQLITE_IOERR_READ",
   IoErrShortRead = 522 => "SQLITE_IOERR_SHORT_READ",
   IoErrWrite = 778 => "SQLITE_IOERR_WRITE",
   IoErrFsync = 1034 => "SQLITE_IOERR_FSYNC",
   IoErrDirFsync = 1290 => "SQLITE_IOERR_DIR_FSYNC",
   IoErrTruncate = 1546 => "SQLITE_IOERR_TRUNCATE",
   IoErrFstat = 1802 => "SQLITE_IOERR_FSTAT",
   IoErrUnlock = 2058 => "SQLITE_IOERR_UNLOCK",
   IoErrRdLock = 2314 => "SQLITE_IOERR_RDLOCK",
   IoErrDelete = 2570 => "SQLITE_IOERR_DELETE",
   IoErrBlocked = 2826 => "SQLITE_IOERR_BLOCKED",
   IoErrNoMem = 3082 => "SQLITE_IOERR_NOMEM",
   IoErrAccess = 3338 => "SQLITE_IOERR_ACCESS",
   IoErrCheckReservedLock = 3594 => "SQLITE_IOERR_CHECKRESERVEDLOCK",
   IoErrLock = 3850 => "SQLITE_IOERR_LOCK",
   IoErrClose = 4106 => "SQLITE_IOERR_CLOSE",
   IoErrDirClose = 4362 => "SQLITE_IOERR_DIR_CLOSE",
   IoErrShmOpen = 4618 => "SQLITE_IOERR_SHMOPEN",
   IoErrShmSize = 4874 => "SQLITE_IOERR_SHMSIZE",
   IoErrShmLock = 5130 => "SQLITE_IOERR_SHMLOCK",
   IoErrShmMap = 5386 => "SQLITE_IOERR_SHMMAP",
   IoErrSeek = 5642 => "SQLITE_IOERR_SEEK",
   IoErrDeleteNoEnt = 5898 => "SQLITE_IOERR_DELETE_NOENT",
   IoErrMmap = 6154 => "SQLITE_IOERR_MMAP",
   IoErrGetTempPath = 6410 => "SQLITE_IOERR_GETTEMPPATH",
   IoErrConvPath = 6666 => "SQLITE_IOERR_CONVPATH",
   IoErrVnode = 6922 => "SQLITE_IOERR_VNODE",
   IoErrAuth = 7178 => "SQLITE_IOERR_AUTH",
   IoErrBeginAtomic = 7434 => "SQLITE_IOERR_BEGIN_ATOMIC",
   IoErrCommitAtomic = 7690 => "SQLITE_IOERR_COMMIT_ATOMIC",
   IoErrRollbackAtomic = 7946 => "SQLITE_IOERR_ROLLBACK_ATOMIC",
   IoErrData = 8202 => "SQLITE_IOERR_DATA",
   IoErrCorruptFs = 8458 => "SQLITE_IOERR_CORRUPTFS",
   IoErrInPage = 8714 => "SQLITE_IOERR_IN_PAGE",

   // ─── Extended: corrupt, cantopen ───
   CorruptVtab = 267 => "SQLITE_CORRUPT_VTAB",
   CorruptSequence = 523 => "SQLITE_CORRUPT_SEQUENCE",
   CorruptIndex = 779 => "SQLITE_CORRUPT_INDEX",
   CantOpenNoTempDir = 270 => "SQLITE_CANTOPEN_NOTEMPDIR",
   CantOpenIsDir = 526 => "SQLITE_CANTOPEN_ISDIR",
   CantOpenFullPath = 782 => "SQLITE_CANTOPEN_FULLPATH",
   CantOpenConvPath = 1038 => "SQLITE_CANTOPEN_CONVPATH",
   CantOpenDirtyWal = 1294 => "SQLITE_CANTOPEN_DIRTYWAL",
   CantOpenSymlink = 1550 => "SQLITE_CANTOPEN_SYMLINK",

   // ─── Extended: constraint ───
   ConstraintCheck = 275 => "SQLITE_CONSTRAINT_CHECK",
   ConstraintCommitHook = 531 => "SQLITE_CONSTRAINT_COMMITHOOK",
   ConstraintForeignKey = 787 => "SQLITE_CONSTRAINT_FOREIGNKEY",
   ConstraintFunction = 1043 => "SQLITE_CONSTRAINT_FUNCTION",
   ConstraintNotNull = 1299 => "SQLITE_CONSTRAINT_NOTNULL",
   ConstraintPrimaryKey = 1555 => "SQLITE_CONSTRAINT_PRIMARYKEY",
   ConstraintTrigger = 1811 => "SQLITE_CONSTRAINT_TRIGGER",
   ConstraintUnique = 2067 => "SQLITE_CONSTRAINT_UNIQUE",
   ConstraintVtab = 2323 => "SQLITE_CONSTRAINT_VTAB",
   ConstraintRowId = 2579 => "SQLITE_CONSTRAINT_ROWID",
   ConstraintPinned = 2835 => "SQLITE_CONSTRAINT_PINNED",
   ConstraintDataType = 3091 => "SQLITE_CONSTRAINT_DATATYPE",

   // ─── Extended: notice, warning, auth ───
   NoticeRecoverWal = 283 => "SQLITE_NOTICE_RECOVER_WAL",
   NoticeRecoverRollback = 539 => "SQLITE_NOTICE_RECOVER_ROLLBACK",
   NoticeRbu = 795 => "SQLITE_NOTICE_RBU",
   WarningAutoIndex = 284 => "SQLITE_WARNING_AUTOINDEX",
   AuthUser = 279 => "SQLITE_AUTH_USER",
}

impl ResultCode {
   /// The primary code this code refines; primary codes return themselves.
   pub const fn primary(self) -> Self {
      Self::from_raw(self.raw() & PRIMARY_MASK)
   }

   /// Returns `true` if this code carries a refinement beyond its primary code.
   pub const fn is_extended(self) -> bool {
      self.raw() & !PRIMARY_MASK != 0
   }

   /// Returns `true` if this code reports a failure.
   ///
   /// [`ResultCode::Unknown`] is always a failure, whatever its low byte.
   pub const fn is_error(self) -> bool {
      matches!(self, ResultCode::Unknown(_))
         || !matches!(
            self.primary(),
            ResultCode::Ok | ResultCode::Row | ResultCode::Done
         )
   }

   /// Returns `true` for `Ok`, `Row`, `Done` and every `Ok*` refinement.
   ///
   /// Decided on the integer value, independently of [`ResultCode::is_error`].
   pub const fn is_non_error(self) -> bool {
      match self {
         ResultCode::Unknown(_) => false,
         named => matches!(
            named.raw() & PRIMARY_MASK,
            ffi::SQLITE_OK | ffi::SQLITE_ROW | ffi::SQLITE_DONE
         ),
      }
   }

   /// The engine's static description of this code.
   pub fn errstr(self) -> &'static str {
      self.errstr_cstr().to_str().unwrap_or(UNKNOWN_ERROR)
   }

   /// The engine's description as the NUL-terminated string it returned.
   pub fn errstr_cstr(self) -> &'static CStr {
      // SAFETY: sqlite3_errstr is a pure table lookup. It returns a pointer to
      // a static NUL-terminated string for every input, unknown codes included.
      let ptr = unsafe { ffi::sqlite3_errstr(self.raw()) };
      if ptr.is_null() {
         return c"unknown error";
      }
      // SAFETY: non-null and static per the above.
      unsafe { CStr::from_ptr(ptr) }
   }
}

impl fmt::Display for ResultCode {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         ResultCode::Unknown(raw) => write!(f, "{} (code {})", self.errstr(), raw),
         _ => write!(f, "{} ({})", self.errstr(), self.name()),
      }
   }
}

impl From<c_int> for ResultCode {
   fn from(raw: c_int) -> Self {
      ResultCode::from_raw(raw)
   }
}

impl From<ResultCode> for c_int {
   fn from(code: ResultCode) -> Self {
      code.raw()
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_raw_round_trip_for_every_named_code() {
      for &code in ResultCode::ALL {
         assert_eq!(ResultCode::from_raw(code.raw()), code, "{}", code.name());
         assert_eq!(c_int::from(code), code.raw());
      }
   }

   #[test]
   fn test_table_values_are_unique() {
      let mut seen = std::collections::HashSet::new();
      for &code in ResultCode::ALL {
         assert!(seen.insert(code.raw()), "duplicate value for {}", code.name());
      }
   }

   #[test]
   fn test_enum_to_int_and_back() {
      assert_eq!(ResultCode::from(c_int::from(ResultCode::Perm)), ResultCode::Perm);
      assert_eq!(ResultCode::Perm.raw(), 3);
   }

   #[test]
   fn test_unmapped_value_is_kept_opaque() {
      let code = ResultCode::from_raw(4242);
      assert_eq!(code, ResultCode::Unknown(4242));
      assert_eq!(code.raw(), 4242);
      assert_eq!(code.name(), "SQLITE_UNKNOWN");
      assert!(code.is_error());
   }

   #[test]
   fn test_unmapped_value_with_success_low_byte_is_an_error() {
      // 768 = 3 << 8 | SQLITE_OK and 356 = 1 << 8 | SQLITE_DONE name nothing.
      for raw in [768, 1024, 356, 357, 612, 0x7fff_ff00] {
         let code = ResultCode::from_raw(raw);
         assert_eq!(code, ResultCode::Unknown(raw));
         assert!(code.is_error(), "{raw}");
         assert!(!code.is_non_error(), "{raw}");
      }
   }

   #[test]
   fn test_every_extended_code_has_a_named_primary() {
      for &code in ResultCode::ALL {
         let primary = code.primary();
         assert!(!matches!(primary, ResultCode::Unknown(_)), "{}", code.name());
         assert!(!primary.is_extended());
         assert_eq!(code.is_extended(), code != primary);
      }
   }

   #[test]
   fn test_primary_strips_refinement() {
      assert_eq!(ResultCode::Ok.primary(), ResultCode::Ok);
      assert_eq!(ResultCode::OkLoadPermanently.primary(), ResultCode::Ok);
      assert_eq!(ResultCode::ErrorRetry.primary(), ResultCode::Error);
      assert_eq!(ResultCode::IoErrRead.primary(), ResultCode::IoErr);
      assert_eq!(ResultCode::ConstraintUnique.primary(), ResultCode::Constraint);
      assert_eq!(ResultCode::Row.primary(), ResultCode::Row);
   }

   #[test]
   fn test_display_includes_name() {
      let s = ResultCode::Busy.to_string();
      assert!(s.contains("SQLITE_BUSY"));
      assert!(s.contains(ResultCode::Busy.errstr()));
   }

   #[test]
   fn test_display_unknown_includes_raw_value() {
      assert!(ResultCode::Unknown(4242).to_string().contains("4242"));
   }
}
