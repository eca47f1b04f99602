//! Static mapping from Rust value types to the bind primitives
//!
//! | Rust type | primitive |
//! |---|---|
//! | [`Blob`], `[T]`, `[T; N]`, `Vec<T>` for `T: Plain` | `sqlite3_bind_blob` |
//! | `f32`, `f64` | `sqlite3_bind_double` |
//! | `bool`, `i8`, `i16`, `i32`, `u8`, `u16` | `sqlite3_bind_int` |
//! | `i64`, `isize`, `u32`, `u64`, `usize` | `sqlite3_bind_int64` |
//! | [`Null`] | `sqlite3_bind_null` |
//! | [`Skip`] | nothing, reports `Ok` |
//! | [`Text`], `str`, `String`, `char`, `CStr`, `CString` | `sqlite3_bind_text` |
//! | `Option<T>` | `sqlite3_bind_null` for `None`, else as `T` |
//!
//! `u64` and `usize` values above `i64::MAX` are stored as their two's
//! complement `i64` reinterpretation and read back unchanged through the same
//! type.
//!
//! Sized types in the table other than [`Null`] and [`Skip`] read back
//! through [`FromColumn`](crate::FromColumn) as themselves. `str`, `CStr` and
//! `[T]` read back as `String`, `CString` and `Vec<T>`.
//!
//! Each implementation returns its primitive's code unchanged.

use std::ffi::{CStr, CString};

use crate::parameter::Parameter;
use crate::statement::Statement;
use crate::value::{Blob, Null, Plain, Skip, Text};
use crate::ResultCode;

/// A value that can be bound to a statement parameter.
///
/// Object safe, so mixed values can be bound through `&[&dyn Bind]`.
pub trait Bind {
   fn bind(&self, param: Parameter<'_>) -> ResultCode;
}

impl<T: Bind + ?Sized> Bind for &T {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      (**self).bind(param)
   }
}

impl<T: Bind> Bind for Option<T> {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      match self {
         Some(value) => value.bind(param),
         None => param.bind_null(),
      }
   }
}

impl Bind for Blob<'_> {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_blob(*self)
   }
}

impl Bind for f64 {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_double(*self)
   }
}

impl Bind for f32 {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_double(f64::from(*self))
   }
}

macro_rules! bind_as_int {
   ($($ty:ty),*) => {
      $(
         impl Bind for $ty {
            fn bind(&self, param: Parameter<'_>) -> ResultCode {
               param.bind_int(i32::from(*self))
            }
         }
      )*
   };
}

bind_as_int!(bool, i8, i16, i32, u8, u16);

macro_rules! bind_as_int64 {
   ($($ty:ty),*) => {
      $(
         impl Bind for $ty {
            #[allow(clippy::cast_possible_wrap)]
            fn bind(&self, param: Parameter<'_>) -> ResultCode {
               param.bind_int64(*self as i64)
            }
         }
      )*
   };
}

bind_as_int64!(i64, isize, u32, u64, usize);

impl Bind for Null {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_null()
   }
}

impl Bind for Skip {
   fn bind(&self, _param: Parameter<'_>) -> ResultCode {
      ResultCode::Ok
   }
}

impl Bind for Text<'_> {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_text(*self)
   }
}

impl Bind for str {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_text(Text::new(self))
   }
}

impl Bind for String {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_text(Text::new(self))
   }
}

impl Bind for char {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      let mut buf = [0u8; 4];
      param.bind_text(Text::new(self.encode_utf8(&mut buf)))
   }
}

impl Bind for CStr {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_text(Text::from_bytes(self.to_bytes()))
   }
}

impl Bind for CString {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      self.as_c_str().bind(param)
   }
}

impl<T: Plain> Bind for [T] {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_blob(Blob::from_slice(self))
   }
}

impl<T: Plain, const N: usize> Bind for [T; N] {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_blob(Blob::from_slice(self.as_slice()))
   }
}

impl<T: Plain> Bind for Vec<T> {
   fn bind(&self, param: Parameter<'_>) -> ResultCode {
      param.bind_blob(Blob::from_slice(self.as_slice()))
   }
}

/// A row of values bound to consecutive slots starting at 1.
///
/// Implemented for `()`, tuples of up to twelve [`Bind`] values and slices
/// or arrays of `&dyn Bind`.
pub trait BindValues {
   /// Binds left to right, stopping at the first failure.
   ///
   /// Returns the code of the last bind attempted and the last slot bound
   /// successfully (0 when nothing was bound).
   fn bind_values(&self, stmt: &Statement<'_>) -> (ResultCode, usize);
}

fn bind_each<'a>(
   stmt: &Statement<'_>,
   values: impl IntoIterator<Item = &'a dyn Bind>,
) -> (ResultCode, usize) {
   let mut code = ResultCode::Ok;
   let mut bound = 0;
   for (slot, value) in (1..).zip(values) {
      code = stmt.bind(slot, value);
      if code.is_error() {
         break;
      }
      bound = slot;
   }
   (code, bound)
}

impl<V: BindValues + ?Sized> BindValues for &V {
   fn bind_values(&self, stmt: &Statement<'_>) -> (ResultCode, usize) {
      (**self).bind_values(stmt)
   }
}

impl BindValues for () {
   fn bind_values(&self, _stmt: &Statement<'_>) -> (ResultCode, usize) {
      (ResultCode::Ok, 0)
   }
}

impl BindValues for [&dyn Bind] {
   fn bind_values(&self, stmt: &Statement<'_>) -> (ResultCode, usize) {
      bind_each(stmt, self.iter().copied())
   }
}

impl<const N: usize> BindValues for [&dyn Bind; N] {
   fn bind_values(&self, stmt: &Statement<'_>) -> (ResultCode, usize) {
      bind_each(stmt, self.iter().copied())
   }
}

macro_rules! bind_values_for_tuples {
   ($(($($name:ident),+))+) => {
      $(
         impl<$($name: Bind),+> BindValues for ($($name,)+) {
            #[allow(non_snake_case)]
            fn bind_values(&self, stmt: &Statement<'_>) -> (ResultCode, usize) {
               let ($($name,)+) = self;
               bind_each(stmt, [$($name as &dyn Bind),+])
            }
         }
      )+
   };
}

bind_values_for_tuples! {
   (A)
   (A, B)
   (A, B, C)
   (A, B, C, D)
   (A, B, C, D, E)
   (A, B, C, D, E, F)
   (A, B, C, D, E, F, G)
   (A, B, C, D, E, F, G, H)
   (A, B, C, D, E, F, G, H, I)
   (A, B, C, D, E, F, G, H, I, J)
   (A, B, C, D, E, F, G, H, I, J, K)
   (A, B, C, D, E, F, G, H, I, J, K, L)
}

/// Binds `values` to `stmt` from slot 1. See [`BindValues::bind_values`].
///
/// ```
/// use sqlite_typed::{Connection, Statement, bind};
///
/// let db = Connection::open_memory()?;
/// db.execute_batch("CREATE TABLE t(a INTEGER, b REAL)")?;
///
/// let stmt = Statement::new(&db, "INSERT INTO t VALUES (?, ?)")?;
/// let (code, last) = bind(&stmt, &(7, 2.5));
/// assert!(!code.is_error());
/// assert_eq!(last, 2);
/// # Ok::<(), sqlite_typed::Error>(())
/// ```
pub fn bind<V: BindValues + ?Sized>(stmt: &Statement<'_>, values: &V) -> (ResultCode, usize) {
   values.bind_values(stmt)
}
