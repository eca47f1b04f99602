//! Borrowed views and markers passed to the bind and column primitives.
//!
//! The views never own or copy bytes. Bound values are copied by the engine
//! during the bind call, so a view only has to outlive that call.

use std::borrow::Cow;
use std::ffi::c_int;
use std::mem;
use std::str::Utf8Error;

/// Element types that may be reinterpreted to and from raw bytes.
///
/// # Safety
///
/// Implementors must have no padding, no invalid bit patterns and no
/// pointers, so that any byte sequence of the right length is a valid value.
pub unsafe trait Plain: Copy + 'static {}

macro_rules! impl_plain {
   ($($ty:ty),* $(,)?) => {
      $(
         // SAFETY: primitive numbers have no padding and accept every bit pattern.
         unsafe impl Plain for $ty {}
      )*
   };
}

impl_plain!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// A borrowed byte buffer, bound with `sqlite3_bind_blob`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Blob<'a>(&'a [u8]);

impl<'a> Blob<'a> {
   pub const fn new(bytes: &'a [u8]) -> Self {
      Self(bytes)
   }

   /// Views the raw byte extent of a slice of plain values.
   pub fn from_slice<T: Plain>(values: &'a [T]) -> Self {
      let len = mem::size_of_val(values);
      // SAFETY: `T: Plain` has no padding, so every byte of the slice is
      // initialized, and the view borrows `values` for its whole lifetime.
      let bytes = unsafe { std::slice::from_raw_parts(values.as_ptr().cast::<u8>(), len) };
      Self(bytes)
   }

   pub const fn as_bytes(&self) -> &'a [u8] {
      self.0
   }

   pub const fn len(&self) -> usize {
      self.0.len()
   }

   pub const fn is_empty(&self) -> bool {
      self.0.is_empty()
   }

   /// Reinterprets the bytes as a sequence of `T`.
   ///
   /// A trailing partial element is ignored.
   pub fn to_vec_of<T: Plain>(&self) -> Vec<T> {
      let size = mem::size_of::<T>();
      if size == 0 {
         return Vec::new();
      }
      self
         .0
         .chunks_exact(size)
         // SAFETY: each chunk holds exactly `size_of::<T>()` bytes and
         // `T: Plain` accepts any bit pattern. The read tolerates misalignment.
         .map(|chunk| unsafe { chunk.as_ptr().cast::<T>().read_unaligned() })
         .collect()
   }
}

impl<'a> From<&'a [u8]> for Blob<'a> {
   fn from(bytes: &'a [u8]) -> Self {
      Self(bytes)
   }
}

impl<'a> From<&'a Vec<u8>> for Blob<'a> {
   fn from(bytes: &'a Vec<u8>) -> Self {
      Self(bytes.as_slice())
   }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Blob<'a> {
   fn from(bytes: &'a [u8; N]) -> Self {
      Self(bytes.as_slice())
   }
}

/// Borrowed UTF-8 text, bound with `sqlite3_bind_text`.
///
/// Text read back from a column is whatever bytes the engine stored, so
/// validation is deferred to [`Text::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Text<'a>(&'a [u8]);

impl<'a> Text<'a> {
   pub const fn new(text: &'a str) -> Self {
      Self(text.as_bytes())
   }

   pub const fn from_bytes(bytes: &'a [u8]) -> Self {
      Self(bytes)
   }

   pub const fn as_bytes(&self) -> &'a [u8] {
      self.0
   }

   pub const fn len(&self) -> usize {
      self.0.len()
   }

   pub const fn is_empty(&self) -> bool {
      self.0.is_empty()
   }

   pub fn as_str(&self) -> Result<&'a str, Utf8Error> {
      std::str::from_utf8(self.0)
   }

   pub fn to_string_lossy(&self) -> Cow<'a, str> {
      String::from_utf8_lossy(self.0)
   }
}

impl<'a> From<&'a str> for Text<'a> {
   fn from(text: &'a str) -> Self {
      Self::new(text)
   }
}

impl<'a> From<&'a String> for Text<'a> {
   fn from(text: &'a String) -> Self {
      Self::new(text.as_str())
   }
}

/// Binds SQL `NULL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Null;

/// Leaves a slot untouched while still occupying its position in a
/// multi-value bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Skip;

/// The storage class of a column value, as reported by `sqlite3_column_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Datatype {
   Integer = 1,
   Float = 2,
   Text = 3,
   Blob = 4,
   Null = 5,
}

impl Datatype {
   pub const fn from_raw(raw: c_int) -> Option<Self> {
      match raw {
         1 => Some(Datatype::Integer),
         2 => Some(Datatype::Float),
         3 => Some(Datatype::Text),
         4 => Some(Datatype::Blob),
         5 => Some(Datatype::Null),
         _ => None,
      }
   }

   pub const fn raw(self) -> c_int {
      self as c_int
   }
}
