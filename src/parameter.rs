//! Non-owning reference to one parameter slot of a statement

use std::fmt;

use crate::bind::Bind;
use crate::statement::Statement;
use crate::value::{Blob, Text};
use crate::ResultCode;

/// A statement and a 1-based slot index.
///
/// Parameters are what [`Bind`] implementations bind into. They borrow the
/// statement, so they cannot outlive it or survive a step. The slot is not
/// range-checked; binding an invalid slot reports `Range`.
#[derive(Clone, Copy)]
pub struct Parameter<'s> {
   stmt: &'s Statement<'s>,
   slot: usize,
}

impl<'s> Parameter<'s> {
   pub fn new(stmt: &'s Statement<'s>, slot: usize) -> Self {
      Self { stmt, slot }
   }

   /// The 1-based slot index.
   pub fn index(&self) -> usize {
      self.slot
   }

   pub fn statement(&self) -> &'s Statement<'s> {
      self.stmt
   }

   /// The slot's name (`:id`), or `None` for anonymous parameters.
   pub fn name(&self) -> Option<&'s str> {
      self.stmt.bind_parameter_name(self.slot)
   }

   pub fn bind_blob(&self, value: Blob<'_>) -> ResultCode {
      self.stmt.bind_blob(self.slot, value)
   }

   pub fn bind_double(&self, value: f64) -> ResultCode {
      self.stmt.bind_double(self.slot, value)
   }

   pub fn bind_int(&self, value: i32) -> ResultCode {
      self.stmt.bind_int(self.slot, value)
   }

   pub fn bind_int64(&self, value: i64) -> ResultCode {
      self.stmt.bind_int64(self.slot, value)
   }

   pub fn bind_null(&self) -> ResultCode {
      self.stmt.bind_null(self.slot)
   }

   pub fn bind_text(&self, value: Text<'_>) -> ResultCode {
      self.stmt.bind_text(self.slot, value)
   }

   pub fn bind_zeroblob(&self, len: usize) -> ResultCode {
      self.stmt.bind_zeroblob(self.slot, len)
   }

   /// Binds `value` through its [`Bind`] implementation.
   pub fn bind<T: Bind + ?Sized>(&self, value: &T) -> ResultCode {
      value.bind(*self)
   }
}

impl fmt::Debug for Parameter<'_> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("Parameter")
         .field("statement", &self.stmt.as_ptr())
         .field("slot", &self.slot)
         .finish()
   }
}
