//! Owned prepared statement
//!
//! Slot indexes are 1-based, column indexes 0-based. Neither is range-checked
//! here: an out-of-range slot comes back from the engine as `Range`, and an
//! out-of-range column reads as NULL.

use std::ffi::{CStr, CString, c_char, c_int};
use std::fmt;
use std::marker::PhantomData;
use std::str::Utf8Error;

use libsqlite3_sys as ffi;
use tracing::trace;

use crate::bind::{Bind, BindValues};
use crate::column::{Columns, FromColumn};
use crate::connection::{Connection, message_from};
use crate::error::{Error, Result};
use crate::handle::{OwnedHandle, StatementKind};
use crate::parameter::Parameter;
use crate::value::{Blob, Datatype, Text};
use crate::ResultCode;

/// Converts a caller index to the engine's integer type.
///
/// Indexes past `c_int::MAX` saturate so the engine reports them out of range.
pub(crate) fn to_c_index(index: usize) -> c_int {
   c_int::try_from(index).unwrap_or(c_int::MAX)
}

/// An owned prepared statement, borrowed from the [`Connection`] that
/// compiled it.
///
/// Stepping, resetting and finalizing take `&mut self`. Binding and reading
/// take `&self`, so a borrowed [`Text`], [`Blob`] or column name can never
/// outlive the step that would invalidate it.
///
/// An empty statement answers every engine call with
/// [`ResultCode::Misuse`] and every column read with a neutral value
/// (zero, empty, [`Datatype::Null`]).
#[derive(Default)]
pub struct Statement<'conn> {
   handle: OwnedHandle<StatementKind>,
   _conn: PhantomData<&'conn Connection>,
}

impl<'conn> Statement<'conn> {
   /// Compiles `sql` on `conn`, failing with the engine's code and message.
   ///
   /// Shares its implementation with [`Connection::prepare`], which reports
   /// the code instead.
   pub fn new(conn: &'conn Connection, sql: &str) -> Result<Self> {
      let mut stmt = Statement::default();
      let code = conn.prepare(sql, &mut stmt);
      if code.is_error() {
         return Err(conn.error(code));
      }
      Ok(stmt)
   }

   pub(crate) fn from_handle(handle: OwnedHandle<StatementKind>) -> Self {
      Self {
         handle,
         _conn: PhantomData,
      }
   }

   /// Takes ownership of a prepared `sqlite3_stmt*`.
   ///
   /// # Safety
   ///
   /// `raw` must be null or a live statement that nothing else will finalize,
   /// prepared on a connection that outlives `'conn`.
   pub unsafe fn from_raw(raw: *mut ffi::sqlite3_stmt) -> Self {
      // SAFETY: forwarded to the caller.
      Self::from_handle(unsafe { OwnedHandle::adopt(raw) })
   }

   fn call(&self, f: impl FnOnce(*mut ffi::sqlite3_stmt) -> c_int) -> ResultCode {
      match self.handle.get() {
         Some(raw) => ResultCode::from_raw(f(raw.as_ptr())),
         None => ResultCode::Misuse,
      }
   }

   fn read<T: Default>(&self, f: impl FnOnce(*mut ffi::sqlite3_stmt) -> T) -> T {
      self.handle.get().map_or_else(T::default, |raw| f(raw.as_ptr()))
   }

   // ─── Execution ───

   /// Advances to the next row.
   ///
   /// Returns `Row` while a row is available, `Done` once execution has
   /// finished, or an error code.
   pub fn step(&mut self) -> ResultCode {
      // SAFETY: `raw` is a live statement owned by `self`.
      self.call(|raw| unsafe { ffi::sqlite3_step(raw) })
   }

   /// Steps and reports whether a row is available, failing on error codes.
   pub fn try_step(&mut self) -> Result<bool> {
      match self.step() {
         ResultCode::Row => Ok(true),
         code if code.is_error() => Err(self.error(code)),
         _ => Ok(false),
      }
   }

   /// Rewinds so the statement can run again. Bindings are kept.
   pub fn reset(&mut self) -> ResultCode {
      // SAFETY: `raw` is a live statement owned by `self`.
      self.call(|raw| unsafe { ffi::sqlite3_reset(raw) })
   }

   /// Sets every slot back to NULL. Independent of [`reset`](Self::reset).
   pub fn clear_bindings(&mut self) -> ResultCode {
      // SAFETY: `raw` is a live statement owned by `self`.
      self.call(|raw| unsafe { ffi::sqlite3_clear_bindings(raw) })
   }

   /// Releases the statement now and leaves it empty.
   ///
   /// Idempotent: finalizing an empty statement returns `Ok`. The code of a
   /// live statement is that of its most recent failed step, if any.
   pub fn finalize(&mut self) -> ResultCode {
      self.handle.release()
   }

   // ─── Introspection ───

   /// The SQL text the statement was compiled from.
   pub fn sql(&self) -> Option<&str> {
      let raw = self.handle.get()?;
      // SAFETY: the engine keeps the text alive until the statement is
      // finalized, which needs `&mut self`.
      let text = unsafe { ffi::sqlite3_sql(raw.as_ptr()) };
      if text.is_null() {
         return None;
      }
      // SAFETY: non-null and NUL-terminated.
      unsafe { CStr::from_ptr(text) }.to_str().ok()
   }

   /// The SQL text with bound values substituted for the parameters.
   pub fn expanded_sql(&self) -> Option<String> {
      let raw = self.handle.get()?;
      // SAFETY: `raw` is live. The result is owned by the caller and must be
      // freed with `sqlite3_free`.
      let text = unsafe { ffi::sqlite3_expanded_sql(raw.as_ptr()) };
      if text.is_null() {
         return None;
      }
      // SAFETY: non-null and NUL-terminated. Freed right after copying.
      unsafe {
         let expanded = CStr::from_ptr(text).to_string_lossy().into_owned();
         ffi::sqlite3_free(text.cast());
         Some(expanded)
      }
   }

   /// The connection's message for the most recent failure on this statement.
   pub fn errmsg(&self) -> String {
      let Some(raw) = self.handle.get() else {
         return ResultCode::Misuse.errstr().to_string();
      };
      // SAFETY: `raw` is live, so its connection is open.
      unsafe { message_from(ffi::sqlite3_errmsg(ffi::sqlite3_db_handle(raw.as_ptr()))) }
   }

   pub(crate) fn error(&self, code: ResultCode) -> Error {
      Error::sqlite(code, self.errmsg())
   }

   // ─── Binding ───

   /// Binds a copy of `value`. An empty blob binds as a zero-length blob,
   /// not NULL.
   pub fn bind_blob<'b>(&self, slot: usize, value: impl Into<Blob<'b>>) -> ResultCode {
      let bytes = value.into().as_bytes();
      let Ok(len) = c_int::try_from(bytes.len()) else {
         return ResultCode::TooBig;
      };
      self.call(|raw| {
         // SAFETY: `bytes` is readable for `len` bytes and is copied by the
         // engine before the call returns.
         unsafe {
            if bytes.is_empty() {
               ffi::sqlite3_bind_zeroblob(raw, to_c_index(slot), 0)
            } else {
               ffi::sqlite3_bind_blob(
                  raw,
                  to_c_index(slot),
                  bytes.as_ptr().cast(),
                  len,
                  ffi::SQLITE_TRANSIENT(),
               )
            }
         }
      })
   }

   pub fn bind_double(&self, slot: usize, value: f64) -> ResultCode {
      // SAFETY: `raw` is a live statement owned by `self`.
      self.call(|raw| unsafe { ffi::sqlite3_bind_double(raw, to_c_index(slot), value) })
   }

   pub fn bind_int(&self, slot: usize, value: i32) -> ResultCode {
      // SAFETY: `raw` is a live statement owned by `self`.
      self.call(|raw| unsafe { ffi::sqlite3_bind_int(raw, to_c_index(slot), value) })
   }

   pub fn bind_int64(&self, slot: usize, value: i64) -> ResultCode {
      // SAFETY: `raw` is a live statement owned by `self`.
      self.call(|raw| unsafe { ffi::sqlite3_bind_int64(raw, to_c_index(slot), value) })
   }

   pub fn bind_null(&self, slot: usize) -> ResultCode {
      // SAFETY: `raw` is a live statement owned by `self`.
      self.call(|raw| unsafe { ffi::sqlite3_bind_null(raw, to_c_index(slot)) })
   }

   /// Binds a copy of `value`. Empty text binds as `''`, not NULL.
   pub fn bind_text<'t>(&self, slot: usize, value: impl Into<Text<'t>>) -> ResultCode {
      let bytes = value.into().as_bytes();
      let Ok(len) = c_int::try_from(bytes.len()) else {
         return ResultCode::TooBig;
      };
      // A null pointer would bind NULL, so empty text points at a static "".
      let text: *const c_char = if bytes.is_empty() {
         c"".as_ptr()
      } else {
         bytes.as_ptr().cast()
      };
      self.call(|raw| {
         // SAFETY: `text` is readable for `len` bytes and is copied by the
         // engine before the call returns.
         unsafe {
            ffi::sqlite3_bind_text(raw, to_c_index(slot), text, len, ffi::SQLITE_TRANSIENT())
         }
      })
   }

   /// Binds a blob of `len` zero bytes.
   pub fn bind_zeroblob(&self, slot: usize, len: usize) -> ResultCode {
      let Ok(len) = c_int::try_from(len) else {
         return ResultCode::TooBig;
      };
      // SAFETY: `raw` is a live statement owned by `self`.
      self.call(|raw| unsafe { ffi::sqlite3_bind_zeroblob(raw, to_c_index(slot), len) })
   }

   /// Binds `value` to `slot` through its [`Bind`] implementation.
   pub fn bind<T: Bind + ?Sized>(&self, slot: usize, value: &T) -> ResultCode {
      value.bind(Parameter::new(self, slot))
   }

   /// Binds `values` to slots 1, 2, ... in order.
   ///
   /// Stops at the first failure. Returns the code of the last bind attempted
   /// and the last slot bound successfully (0 if none).
   pub fn bind_values<V: BindValues + ?Sized>(&self, values: &V) -> (ResultCode, usize) {
      values.bind_values(self)
   }

   pub fn parameter(&self, slot: usize) -> Parameter<'_> {
      Parameter::new(self, slot)
   }

   /// The parameter called `name`, including its prefix (`:id`, `@id`, `$id`).
   pub fn parameter_named(&self, name: &str) -> Option<Parameter<'_>> {
      self.bind_parameter_index(name).map(|slot| Parameter::new(self, slot))
   }

   /// The largest slot index in the statement.
   pub fn bind_parameter_count(&self) -> usize {
      // SAFETY: `raw` is a live statement owned by `self`.
      let count = self.read(|raw| unsafe { ffi::sqlite3_bind_parameter_count(raw) });
      usize::try_from(count).unwrap_or(0)
   }

   /// The slot of the parameter called `name`, or `None` if there is none.
   pub fn bind_parameter_index(&self, name: &str) -> Option<usize> {
      let name = CString::new(name).ok()?;
      // SAFETY: `raw` is live and `name` is NUL-terminated.
      let slot = self.read(|raw| unsafe { ffi::sqlite3_bind_parameter_index(raw, name.as_ptr()) });
      usize::try_from(slot).ok().filter(|&slot| slot > 0)
   }

   /// The name of `slot`, or `None` for anonymous `?` parameters.
   pub fn bind_parameter_name(&self, slot: usize) -> Option<&str> {
      let raw = self.handle.get()?;
      // SAFETY: names live as long as the statement.
      let name = unsafe { ffi::sqlite3_bind_parameter_name(raw.as_ptr(), to_c_index(slot)) };
      // SAFETY: non-null names are NUL-terminated.
      unsafe { borrowed_str(name) }
   }

   // ─── Columns ───

   /// Columns in the result set, zero for statements that return no data.
   pub fn column_count(&self) -> usize {
      // SAFETY: `raw` is a live statement owned by `self`.
      let count = self.read(|raw| unsafe { ffi::sqlite3_column_count(raw) });
      usize::try_from(count).unwrap_or(0)
   }

   /// Columns in the current row, zero unless the last step returned `Row`.
   pub fn data_count(&self) -> usize {
      // SAFETY: `raw` is a live statement owned by `self`.
      let count = self.read(|raw| unsafe { ffi::sqlite3_data_count(raw) });
      usize::try_from(count).unwrap_or(0)
   }

   pub fn column_name(&self, index: usize) -> Option<&str> {
      let raw = self.handle.get()?;
      // SAFETY: names live until the statement is finalized or re-stepped.
      let name = unsafe { ffi::sqlite3_column_name(raw.as_ptr(), to_c_index(index)) };
      // SAFETY: non-null names are NUL-terminated.
      unsafe { borrowed_str(name) }
   }

   /// The declared type of a table column, or `None` for expressions.
   pub fn column_decltype(&self, index: usize) -> Option<&str> {
      let raw = self.handle.get()?;
      // SAFETY: see `column_name`.
      let decl = unsafe { ffi::sqlite3_column_decltype(raw.as_ptr(), to_c_index(index)) };
      // SAFETY: non-null declarations are NUL-terminated.
      unsafe { borrowed_str(decl) }
   }

   pub fn column_type(&self, index: usize) -> Datatype {
      // SAFETY: `raw` is a live statement owned by `self`.
      let raw_type = self.read(|raw| unsafe { ffi::sqlite3_column_type(raw, to_c_index(index)) });
      Datatype::from_raw(raw_type).unwrap_or(Datatype::Null)
   }

   pub fn column_bytes(&self, index: usize) -> usize {
      // SAFETY: `raw` is a live statement owned by `self`.
      let len = self.read(|raw| unsafe { ffi::sqlite3_column_bytes(raw, to_c_index(index)) });
      usize::try_from(len).unwrap_or(0)
   }

   pub fn column_double(&self, index: usize) -> f64 {
      // SAFETY: `raw` is a live statement owned by `self`.
      self.read(|raw| unsafe { ffi::sqlite3_column_double(raw, to_c_index(index)) })
   }

   pub fn column_int(&self, index: usize) -> i32 {
      // SAFETY: `raw` is a live statement owned by `self`.
      self.read(|raw| unsafe { ffi::sqlite3_column_int(raw, to_c_index(index)) })
   }

   pub fn column_int64(&self, index: usize) -> i64 {
      // SAFETY: `raw` is a live statement owned by `self`.
      self.read(|raw| unsafe { ffi::sqlite3_column_int64(raw, to_c_index(index)) })
   }

   /// The column's bytes. NULL reads as an empty blob.
   pub fn column_blob(&self, index: usize) -> Blob<'_> {
      self.read(|raw| {
         let index = to_c_index(index);
         // SAFETY: the pointer is fetched before the length, as the engine
         // requires, and stays valid until the next step, reset or finalize,
         // all of which need `&mut self`.
         unsafe {
            let data = ffi::sqlite3_column_blob(raw, index);
            let len = ffi::sqlite3_column_bytes(raw, index);
            Blob::new(raw_bytes(data.cast(), len))
         }
      })
   }

   /// The column's UTF-8 bytes. NULL reads as empty text.
   ///
   /// A BLOB column is read as its raw bytes without conversion, so earlier
   /// borrows of the same column stay valid.
   pub fn column_text(&self, index: usize) -> Text<'_> {
      if self.column_type(index) == Datatype::Blob {
         return Text::from_bytes(self.column_blob(index).as_bytes());
      }
      self.read(|raw| {
         let index = to_c_index(index);
         // SAFETY: see `column_blob`.
         unsafe {
            let data = ffi::sqlite3_column_text(raw, index);
            let len = ffi::sqlite3_column_bytes(raw, index);
            Text::from_bytes(raw_bytes(data, len))
         }
      })
   }

   /// The column as validated UTF-8.
   pub fn column_str(&self, index: usize) -> std::result::Result<&str, Utf8Error> {
      self.column_text(index).as_str()
   }

   /// Reads column `index` through its [`FromColumn`] implementation.
   pub fn get<'r, T: FromColumn<'r>>(&'r self, index: usize) -> T {
      T::from_column(self, index)
   }

   /// A reader over the current row, starting at column 0.
   pub fn columns(&self) -> Columns<'_> {
      Columns::new(self)
   }

   // ─── Ownership ───

   pub fn is_empty(&self) -> bool {
      self.handle.is_empty()
   }

   pub fn has_handle(&self) -> bool {
      self.handle.has_handle()
   }

   /// The raw `sqlite3_stmt*`, or null when empty. Ownership stays here.
   pub fn as_ptr(&self) -> *mut ffi::sqlite3_stmt {
      self.handle.as_ptr()
   }

   /// Gives the raw handle to the caller and leaves this statement empty.
   ///
   /// The caller must finalize the returned handle.
   pub fn take_handle(&mut self) -> *mut ffi::sqlite3_stmt {
      let raw = self.handle.take();
      trace!("Statement handle taken");
      raw
   }
}

impl fmt::Debug for Statement<'_> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("Statement")
         .field("handle", &self.handle)
         .field("sql", &self.sql())
         .finish()
   }
}

/// Builds a slice over engine-owned bytes, empty for null or non-positive
/// lengths.
///
/// # Safety
///
/// A non-null `data` must be readable for `len` bytes for `'a`.
unsafe fn raw_bytes<'a>(data: *const u8, len: c_int) -> &'a [u8] {
   match usize::try_from(len) {
      Ok(len) if len > 0 && !data.is_null() => {
         // SAFETY: forwarded to the caller.
         unsafe { std::slice::from_raw_parts(data, len) }
      }
      _ => &[],
   }
}

/// # Safety
///
/// A non-null `text` must be NUL-terminated and live for `'a`.
unsafe fn borrowed_str<'a>(text: *const c_char) -> Option<&'a str> {
   if text.is_null() {
      return None;
   }
   // SAFETY: forwarded to the caller.
   unsafe { CStr::from_ptr(text) }.to_str().ok()
}
