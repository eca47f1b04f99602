//! Exclusive ownership of one native SQLite handle.
//!
//! [`OwnedHandle`] is the single place where handles are released. Connection
//! and Statement both wrap one, so the rules below hold for both:
//!
//! - `Default` is the empty state and never touches the engine
//! - adopting a raw pointer takes ownership of it without duplicating it
//! - moving transfers ownership; `std::mem::take` leaves the source empty
//! - the handle is released exactly once, on [`OwnedHandle::release`] or drop
//! - releasing an empty handle is a no-op that reports `Ok`
//! - [`OwnedHandle::take`] gives the raw pointer away for good

use std::ffi::c_int;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use libsqlite3_sys as ffi;
use tracing::{trace, warn};

use crate::ResultCode;

mod sealed {
   pub trait Sealed {}
}

// libsqlite3-sys leaves `sqlite3_close_v2` out of its generated bindings.
// The symbol is part of every SQLite since 3.7.14, bundled builds included.
unsafe extern "C" {
   fn sqlite3_close_v2(db: *mut ffi::sqlite3) -> c_int;
}

/// A kind of native handle: the pointee type and the primitive that frees it.
///
/// Sealed; implemented by [`DatabaseKind`] and [`StatementKind`].
pub trait HandleKind: sealed::Sealed {
   /// The engine's opaque handle type.
   type Raw;

   /// Name used in log lines.
   const LABEL: &'static str;

   /// Releases `raw` and returns the engine's result code.
   ///
   /// # Safety
   ///
   /// `raw` must be a live handle of this kind that has not been released.
   unsafe fn release(raw: NonNull<Self::Raw>) -> c_int;
}

/// Database connections, released with `sqlite3_close_v2`.
///
/// `close_v2` defers the actual close until every statement prepared on the
/// connection is finalized, including statements whose handles were taken out
/// of this crate's management.
#[derive(Debug)]
pub enum DatabaseKind {}

/// Prepared statements, released with `sqlite3_finalize`.
#[derive(Debug)]
pub enum StatementKind {}

impl sealed::Sealed for DatabaseKind {}
impl sealed::Sealed for StatementKind {}

impl HandleKind for DatabaseKind {
   type Raw = ffi::sqlite3;

   const LABEL: &'static str = "connection";

   unsafe fn release(raw: NonNull<ffi::sqlite3>) -> c_int {
      // SAFETY: the caller guarantees `raw` is live and released only here.
      unsafe { sqlite3_close_v2(raw.as_ptr()) }
   }
}

impl HandleKind for StatementKind {
   type Raw = ffi::sqlite3_stmt;

   const LABEL: &'static str = "statement";

   unsafe fn release(raw: NonNull<ffi::sqlite3_stmt>) -> c_int {
      // SAFETY: the caller guarantees `raw` is live and released only here.
      unsafe { ffi::sqlite3_finalize(raw.as_ptr()) }
   }
}

/// Owner of at most one native handle of kind `K`.
///
/// Neither `Clone` nor `Copy`: a handle has exactly one owner at a time.
pub struct OwnedHandle<K: HandleKind> {
   raw: Option<NonNull<K::Raw>>,
   _kind: PhantomData<K>,
}

impl<K: HandleKind> OwnedHandle<K> {
   /// An empty handle.
   pub const fn empty() -> Self {
      Self {
         raw: None,
         _kind: PhantomData,
      }
   }

   /// Takes ownership of `raw`. A null pointer yields an empty handle.
   ///
   /// # Safety
   ///
   /// `raw` must be null or a live handle of kind `K` that nothing else will
   /// release.
   pub unsafe fn adopt(raw: *mut K::Raw) -> Self {
      Self {
         raw: NonNull::new(raw),
         _kind: PhantomData,
      }
   }

   pub fn is_empty(&self) -> bool {
      self.raw.is_none()
   }

   pub fn has_handle(&self) -> bool {
      self.raw.is_some()
   }

   /// The held pointer, or `None` when empty.
   pub fn get(&self) -> Option<NonNull<K::Raw>> {
      self.raw
   }

   /// The held pointer, or null when empty. Ownership stays here.
   pub fn as_ptr(&self) -> *mut K::Raw {
      self.raw.map_or(ptr::null_mut(), NonNull::as_ptr)
   }

   /// Gives up ownership of the held pointer and leaves this handle empty.
   ///
   /// The caller becomes responsible for releasing the returned pointer.
   pub fn take(&mut self) -> *mut K::Raw {
      let raw = self.as_ptr();
      if self.raw.take().is_some() {
         trace!(kind = K::LABEL, "Native handle taken out of ownership");
      }
      raw
   }

   /// Releases the held handle now and leaves this handle empty.
   ///
   /// Returns the engine's code for the release, or `Ok` if empty.
   pub fn release(&mut self) -> ResultCode {
      let Some(raw) = self.raw.take() else {
         return ResultCode::Ok;
      };

      // SAFETY: `raw` came from `adopt` and was just removed from `self`, so
      // this is the only release it will ever see.
      let code = ResultCode::from_raw(unsafe { K::release(raw) });
      trace!(kind = K::LABEL, code = %code, "Released native handle");
      code
   }
}

impl<K: HandleKind> Default for OwnedHandle<K> {
   fn default() -> Self {
      Self::empty()
   }
}

impl<K: HandleKind> Drop for OwnedHandle<K> {
   fn drop(&mut self) {
      let code = self.release();
      if code.is_error() {
         warn!(kind = K::LABEL, code = %code, "Release during drop reported an error");
      }
   }
}

impl<K: HandleKind> fmt::Debug for OwnedHandle<K> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("OwnedHandle")
         .field("kind", &K::LABEL)
         .field("raw", &self.as_ptr())
         .finish()
   }
}
