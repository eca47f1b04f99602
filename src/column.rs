//! Typed reads from the current result row
//!
//! [`FromColumn`] maps a Rust type to the column primitive that produces it,
//! mirroring the bind table: integers through `sqlite3_column_int` or
//! `sqlite3_column_int64`, floats through `sqlite3_column_double`, text and
//! blobs as borrowed views or owned copies, and `Option<T>` as `None` for
//! NULL. Reads follow the engine's type conversions, so NULL reads as zero or
//! empty for non-optional types.
//!
//! Rows may only be read after a step returned `Row`. Reading at any other
//! time, or past the last column, yields the engine's neutral values rather
//! than an error.

use std::ffi::CString;
use std::ops::Shr;

use crate::statement::Statement;
use crate::value::{Blob, Datatype, Plain, Text};

/// A value that can be read from one column of the current row.
pub trait FromColumn<'r>: Sized {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self;
}

impl<'r, T: FromColumn<'r>> FromColumn<'r> for Option<T> {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      match stmt.column_type(index) {
         Datatype::Null => None,
         _ => Some(T::from_column(stmt, index)),
      }
   }
}

impl<'r> FromColumn<'r> for bool {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      stmt.column_int64(index) != 0
   }
}

macro_rules! from_int_column {
   ($($ty:ty),*) => {
      $(
         impl<'r> FromColumn<'r> for $ty {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
               stmt.column_int(index) as $ty
            }
         }
      )*
   };
}

from_int_column!(i8, i16, i32, u8, u16);

macro_rules! from_int64_column {
   ($($ty:ty),*) => {
      $(
         impl<'r> FromColumn<'r> for $ty {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
               stmt.column_int64(index) as $ty
            }
         }
      )*
   };
}

from_int64_column!(i64, isize, u32, u64, usize);

impl<'r> FromColumn<'r> for f64 {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      stmt.column_double(index)
   }
}

impl<'r> FromColumn<'r> for f32 {
   #[allow(clippy::cast_possible_truncation)]
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      stmt.column_double(index) as f32
   }
}

impl<'r> FromColumn<'r> for Text<'r> {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      stmt.column_text(index)
   }
}

impl<'r> FromColumn<'r> for Blob<'r> {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      stmt.column_blob(index)
   }
}

/// Invalid UTF-8 is replaced with U+FFFD.
impl<'r> FromColumn<'r> for String {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      stmt.column_text(index).to_string_lossy().into_owned()
   }
}

/// The first character of the text, or `'\0'` for empty text.
impl<'r> FromColumn<'r> for char {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      stmt.column_text(index)
         .to_string_lossy()
         .chars()
         .next()
         .unwrap_or('\0')
   }
}

/// The text up to its first NUL byte.
impl<'r> FromColumn<'r> for CString {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      let bytes = stmt.column_text(index).as_bytes();
      let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
      CString::new(&bytes[..end]).unwrap_or_default()
   }
}

impl<'r, T: Plain> FromColumn<'r> for Vec<T> {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      stmt.column_blob(index).to_vec_of()
   }
}

/// Elements missing from a short blob are left at their default. Extra
/// bytes are ignored.
impl<'r, T: Plain + Default, const N: usize> FromColumn<'r> for [T; N] {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      let mut out = [T::default(); N];
      let values = stmt.column_blob(index).to_vec_of::<T>();
      for (slot, value) in out.iter_mut().zip(values) {
         *slot = value;
      }
      out
   }
}

impl<'r> FromColumn<'r> for Datatype {
   fn from_column(stmt: &'r Statement<'_>, index: usize) -> Self {
      stmt.column_type(index)
   }
}

/// Several consecutive columns read into a tuple, left to right.
pub trait FromRow<'r>: Sized {
   fn from_row(columns: &mut Columns<'r>) -> Self;
}

macro_rules! from_row_for_tuples {
   ($(($($name:ident),+))+) => {
      $(
         impl<'r, $($name: FromColumn<'r>),+> FromRow<'r> for ($($name,)+) {
            fn from_row(columns: &mut Columns<'r>) -> Self {
               ($(columns.get::<$name>(),)+)
            }
         }
      )+
   };
}

from_row_for_tuples! {
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

/// A cursor over the columns of the current row.
///
/// Every read consumes one column and advances; the cursor never moves back.
///
/// ```
/// use sqlite_typed::{Connection, Statement};
///
/// let db = Connection::open_memory()?;
/// let mut stmt = Statement::new(&db, "SELECT 1, 2.5, 'three'")?;
/// assert!(stmt.try_step()?);
///
/// let mut columns = stmt.columns();
/// let (one, two): (i32, f64) = columns.get_row();
/// let three: String = columns.get();
/// assert_eq!((one, two, three.as_str()), (1, 2.5, "three"));
/// assert_eq!(columns.index(), Some(2));
/// # Ok::<(), sqlite_typed::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Columns<'r> {
   stmt: &'r Statement<'r>,
   next: usize,
}

impl<'r> Columns<'r> {
   pub fn new(stmt: &'r Statement<'_>) -> Self {
      Self { stmt, next: 0 }
   }

   /// Reads the next column as `T`.
   pub fn get<T: FromColumn<'r>>(&mut self) -> T {
      let value = T::from_column(self.stmt, self.next);
      self.next += 1;
      value
   }

   /// Reads one column per tuple element.
   pub fn get_row<R: FromRow<'r>>(&mut self) -> R {
      R::from_row(self)
   }

   /// Reads the next column into `dst`.
   pub fn read<T: FromColumn<'r>>(&mut self, dst: &mut T) -> &mut Self {
      *dst = self.get();
      self
   }

   /// The index of the last column read, or `None` before the first read.
   pub fn index(&self) -> Option<usize> {
      self.next.checked_sub(1)
   }

   /// The index the next read will use.
   pub fn next_index(&self) -> usize {
      self.next
   }

   pub fn statement(&self) -> &'r Statement<'r> {
      self.stmt
   }
}

/// `&mut columns >> &mut a >> &mut b` reads `a` then `b`.
impl<'a, 'r, T: FromColumn<'r>> Shr<&mut T> for &'a mut Columns<'r> {
   type Output = &'a mut Columns<'r>;

   fn shr(self, dst: &mut T) -> Self::Output {
      self.read(dst)
   }
}

/// Reads column 0 of the current row.
pub fn column<'r, T: FromColumn<'r>>(stmt: &'r Statement<'_>) -> T {
   T::from_column(stmt, 0)
}

/// Reads columns 0, 1, ... of the current row into a tuple.
pub fn row<'r, R: FromRow<'r>>(stmt: &'r Statement<'_>) -> R {
   Columns::new(stmt).get_row()
}
