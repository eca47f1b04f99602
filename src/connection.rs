//! Owned database connection

use std::ffi::{CStr, CString, c_char, c_int};
use std::path::Path;
use std::ptr;
use std::time::Duration;

use libsqlite3_sys as ffi;
use tracing::{debug, trace};

use crate::config::{OpenConfig, OpenFlags, PrepareFlags};
use crate::error::{Error, Result};
use crate::handle::{DatabaseKind, OwnedHandle};
use crate::statement::Statement;
use crate::ResultCode;

/// An owned SQLite database connection.
///
/// A `Connection` is either empty or holds exactly one open `sqlite3*`. The
/// handle is closed with `sqlite3_close_v2` when the value is dropped or
/// [`close`](Self::close) is called, whichever comes first. Statements
/// prepared from a connection borrow it, so it cannot be dropped while any
/// of them is alive.
///
/// Every method that needs the engine returns [`ResultCode::Misuse`] on an
/// empty connection rather than passing it a null pointer.
///
/// ```
/// use sqlite_typed::{Connection, Statement};
///
/// let db = Connection::open_memory()?;
/// db.execute_batch("CREATE TABLE t(x INTEGER); INSERT INTO t VALUES (42);")?;
///
/// let mut stmt = Statement::new(&db, "SELECT x FROM t")?;
/// assert!(stmt.try_step()?);
/// assert_eq!(stmt.get::<i64>(0), 42);
/// # Ok::<(), sqlite_typed::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Connection {
   handle: OwnedHandle<DatabaseKind>,
}

// SAFETY: the bundled engine is compiled in serialized threading mode, so a
// connection handle may move to another thread. Connection is not Sync: its
// methods assume one caller at a time, and statements borrow it by reference.
// A system library may be built single-threaded, so unbundled builds stay !Send.
#[cfg(feature = "bundled")]
unsafe impl Send for Connection {}

impl Connection {
   /// Opens (creating if needed) the database at `path` for reading and writing.
   pub fn open(path: impl AsRef<Path>) -> Result<Self> {
      Self::open_with(path, &OpenConfig::default())
   }

   /// Opens a private, temporary in-memory database.
   pub fn open_memory() -> Result<Self> {
      Self::open(":memory:")
   }

   /// Opens the database at `path` as described by `config`.
   ///
   /// On failure the error carries the engine's code and message, and any
   /// partially opened handle has already been closed.
   pub fn open_with(path: impl AsRef<Path>, config: &OpenConfig) -> Result<Self> {
      let conn = Self::open_core(path.as_ref(), config.flags(), config.vfs.as_deref())?;

      if let Some(timeout) = config.busy_timeout {
         let code = conn.busy_timeout(timeout);
         if code.is_error() {
            return Err(conn.error(code));
         }
      }

      Ok(conn)
   }

   /// Opens the database at `path` into `out`, returning the engine's code.
   ///
   /// `out` is emptied first. On failure it stays empty.
   pub fn open_v2(
      path: impl AsRef<Path>,
      flags: OpenFlags,
      vfs: Option<&str>,
      out: &mut Connection,
   ) -> ResultCode {
      *out = Connection::default();
      match Self::open_core(path.as_ref(), flags, vfs) {
         Ok(conn) => {
            *out = conn;
            ResultCode::Ok
         }
         Err(err) => err.code(),
      }
   }

   fn open_core(path: &Path, flags: OpenFlags, vfs: Option<&str>) -> Result<Self> {
      let utf8 = path
         .to_str()
         .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
      let c_path = CString::new(utf8)?;
      let c_vfs = vfs.map(CString::new).transpose()?;

      let mut raw = ptr::null_mut();
      // SAFETY: both strings are NUL-terminated and outlive the call, and
      // `raw` is a valid out-pointer.
      let rc = unsafe {
         ffi::sqlite3_open_v2(
            c_path.as_ptr(),
            &mut raw,
            flags.bits(),
            c_vfs.as_ref().map_or(ptr::null(), |v| v.as_ptr()),
         )
      };

      // The engine hands back a handle even when opening fails (except on
      // SQLITE_NOMEM), so adopt it either way and let drop close it.
      // SAFETY: `raw` is null or a fresh handle nothing else owns.
      let conn = Connection {
         handle: unsafe { OwnedHandle::adopt(raw) },
      };

      let code = ResultCode::from_raw(rc);
      if code.is_error() {
         let err = conn.error(code);
         debug!(path = %path.display(), code = %code, "Failed to open database");
         return Err(err);
      }

      debug!(path = %path.display(), flags = flags.bits(), "Opened database");
      Ok(conn)
   }

   /// Closes the connection now. Closing an empty connection returns `Ok`.
   ///
   /// The handle is closed with `sqlite3_close_v2`, so a statement that was
   /// taken out of this crate's management keeps the database alive until it
   /// is finalized.
   pub fn close(&mut self) -> ResultCode {
      if self.handle.is_empty() {
         return ResultCode::Ok;
      }
      let code = self.handle.release();
      debug!(code = %code, "Closed database");
      code
   }

   /// Compiles the first statement in `sql` into `out`.
   ///
   /// `out` is emptied (finalizing whatever it held) before compiling. On
   /// failure it stays empty. SQL holding only whitespace or comments
   /// succeeds and leaves `out` empty.
   pub fn prepare<'c>(&'c self, sql: &str, out: &mut Statement<'c>) -> ResultCode {
      self.prepare_core(sql, None, out).0
   }

   /// Like [`prepare`](Self::prepare), passing `flags` to `sqlite3_prepare_v3`.
   pub fn prepare_v3<'c>(
      &'c self,
      sql: &str,
      flags: PrepareFlags,
      out: &mut Statement<'c>,
   ) -> ResultCode {
      self.prepare_core(sql, Some(flags), out).0
   }

   /// Like [`prepare`](Self::prepare), also returning the part of `sql` after
   /// the compiled statement.
   pub fn prepare_with_tail<'c, 's>(
      &'c self,
      sql: &'s str,
      out: &mut Statement<'c>,
   ) -> (ResultCode, &'s str) {
      let (code, consumed) = self.prepare_core(sql, None, out);
      (code, sql.get(consumed..).unwrap_or(""))
   }

   /// The single prepare path. Returns the engine's code and the number of
   /// bytes of `sql` the engine consumed.
   fn prepare_core<'c>(
      &'c self,
      sql: &str,
      flags: Option<PrepareFlags>,
      out: &mut Statement<'c>,
   ) -> (ResultCode, usize) {
      *out = Statement::default();

      let Some(db) = self.handle.get() else {
         return (ResultCode::Misuse, 0);
      };
      let Ok(len) = c_int::try_from(sql.len()) else {
         return (ResultCode::TooBig, 0);
      };

      let head = sql.as_ptr().cast::<c_char>();
      let mut raw = ptr::null_mut();
      let mut tail: *const c_char = ptr::null();

      // SAFETY: `db` is open, `head` points at `len` readable bytes (the
      // engine reads no further when given a length) and both out-pointers
      // are valid.
      let rc = unsafe {
         match flags {
            Some(flags) => ffi::sqlite3_prepare_v3(
               db.as_ptr(),
               head,
               len,
               flags.bits(),
               &mut raw,
               &mut tail,
            ),
            None => ffi::sqlite3_prepare_v2(db.as_ptr(), head, len, &mut raw, &mut tail),
         }
      };

      // SAFETY: `raw` is null or a fresh statement nothing else owns.
      let handle = unsafe { OwnedHandle::adopt(raw) };
      let consumed = if tail.is_null() {
         sql.len()
      } else {
         (tail as usize).saturating_sub(head as usize).min(sql.len())
      };

      let code = ResultCode::from_raw(rc);
      if code.is_error() {
         trace!(code = %code, "Failed to prepare statement");
         return (code, consumed);
      }

      trace!(sql = sql.get(..consumed).unwrap_or(""), "Prepared statement");
      *out = Statement::from_handle(handle);
      (code, consumed)
   }

   /// Runs every statement in `sql` in order, discarding any rows.
   ///
   /// Stops at the first failure. Statements before it stay applied.
   pub fn execute_batch(&self, sql: &str) -> Result<()> {
      let mut rest = sql;
      loop {
         let mut stmt = Statement::default();
         let (code, tail) = self.prepare_with_tail(rest, &mut stmt);
         if code.is_error() {
            return Err(self.error(code));
         }

         if stmt.has_handle() {
            while stmt.try_step()? {}
         } else if tail.len() == rest.len() {
            return Ok(());
         }

         if tail.trim().is_empty() {
            return Ok(());
         }
         rest = tail;
      }
   }

   /// The engine's English description of the most recent failure.
   pub fn errmsg(&self) -> String {
      let Some(db) = self.handle.get() else {
         return ResultCode::Misuse.errstr().to_string();
      };
      // SAFETY: `db` is open. The returned string is copied before any other
      // call on the connection can invalidate it.
      unsafe { message_from(ffi::sqlite3_errmsg(db.as_ptr())) }
   }

   /// The code of the most recent failure, primary unless extended result
   /// codes are enabled.
   pub fn errcode(&self) -> ResultCode {
      match self.handle.get() {
         // SAFETY: `db` is open.
         Some(db) => ResultCode::from_raw(unsafe { ffi::sqlite3_errcode(db.as_ptr()) }),
         None => ResultCode::Misuse,
      }
   }

   /// The extended code of the most recent failure.
   pub fn extended_errcode(&self) -> ResultCode {
      match self.handle.get() {
         // SAFETY: `db` is open.
         Some(db) => ResultCode::from_raw(unsafe { ffi::sqlite3_extended_errcode(db.as_ptr()) }),
         None => ResultCode::Misuse,
      }
   }

   pub fn set_extended_result_codes(&self, enabled: bool) -> ResultCode {
      let Some(db) = self.handle.get() else {
         return ResultCode::Misuse;
      };
      // SAFETY: `db` is open.
      let rc = unsafe { ffi::sqlite3_extended_result_codes(db.as_ptr(), c_int::from(enabled)) };
      ResultCode::from_raw(rc)
   }

   /// Retries locked tables for up to `timeout` before reporting `Busy`.
   ///
   /// A zero duration removes the busy handler.
   pub fn busy_timeout(&self, timeout: Duration) -> ResultCode {
      let Some(db) = self.handle.get() else {
         return ResultCode::Misuse;
      };
      let millis = c_int::try_from(timeout.as_millis()).unwrap_or(c_int::MAX);
      // SAFETY: `db` is open.
      ResultCode::from_raw(unsafe { ffi::sqlite3_busy_timeout(db.as_ptr(), millis) })
   }

   /// Asks any running statement on this connection to stop at its next
   /// opportunity. The statement's step then reports `Interrupt`.
   pub fn interrupt(&self) {
      if let Some(db) = self.handle.get() {
         // SAFETY: `db` is open.
         unsafe { ffi::sqlite3_interrupt(db.as_ptr()) }
      }
   }

   /// Rows changed by the most recent INSERT, UPDATE or DELETE.
   pub fn changes(&self) -> i32 {
      // SAFETY: `db` is open.
      self.handle.get().map_or(0, |db| unsafe { ffi::sqlite3_changes(db.as_ptr()) })
   }

   pub fn last_insert_rowid(&self) -> i64 {
      self
         .handle
         .get()
         // SAFETY: `db` is open.
         .map_or(0, |db| unsafe { ffi::sqlite3_last_insert_rowid(db.as_ptr()) })
   }

   /// `false` while an explicit transaction is open.
   pub fn is_autocommit(&self) -> bool {
      self
         .handle
         .get()
         // SAFETY: `db` is open.
         .is_none_or(|db| unsafe { ffi::sqlite3_get_autocommit(db.as_ptr()) } != 0)
   }

   pub fn is_empty(&self) -> bool {
      self.handle.is_empty()
   }

   pub fn has_handle(&self) -> bool {
      self.handle.has_handle()
   }

   /// The raw `sqlite3*`, or null when empty. Ownership stays here.
   pub fn as_ptr(&self) -> *mut ffi::sqlite3 {
      self.handle.as_ptr()
   }

   /// Gives the raw handle to the caller and leaves this connection empty.
   ///
   /// The caller must eventually close the returned handle.
   pub fn take_handle(&mut self) -> *mut ffi::sqlite3 {
      self.handle.take()
   }

   /// Takes ownership of an open `sqlite3*`.
   ///
   /// # Safety
   ///
   /// `raw` must be null or an open connection that nothing else will close.
   pub unsafe fn from_raw(raw: *mut ffi::sqlite3) -> Self {
      Self {
         // SAFETY: forwarded to the caller.
         handle: unsafe { OwnedHandle::adopt(raw) },
      }
   }

   /// Wraps `code` with this connection's current error message.
   pub(crate) fn error(&self, code: ResultCode) -> Error {
      Error::sqlite(code, self.errmsg())
   }
}

/// Copies an engine-owned message, tolerating null.
///
/// # Safety
///
/// `msg` must be null or a NUL-terminated string valid for the call.
pub(crate) unsafe fn message_from(msg: *const c_char) -> String {
   if msg.is_null() {
      return String::new();
   }
   // SAFETY: forwarded to the caller.
   unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
}
