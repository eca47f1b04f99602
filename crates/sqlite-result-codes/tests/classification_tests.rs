use std::ffi::c_int;

use libsqlite3_sys as ffi;
use sqlite_result_codes::{ResultCode, errstr, is_error, is_non_error, primary_result};

// ─── Partition ───

#[test]
fn error_and_non_error_partition_every_named_code() {
   for &code in ResultCode::ALL {
      assert_ne!(
         is_error(code),
         is_non_error(code),
         "{} must be exactly one of error / non-error",
         code.name()
      );
   }
}

#[test]
fn error_and_non_error_partition_unmapped_values() {
   for raw in -1024..=16384 {
      let code = ResultCode::from_raw(raw);
      assert_ne!(is_error(code), is_non_error(code), "raw value {}", raw);
   }
}

#[test]
fn unmapped_values_are_errors() {
   for raw in (-1024..=16384).chain([0x7fff_ff00, c_int::MAX, c_int::MIN]) {
      let code = ResultCode::from_raw(raw);
      if matches!(code, ResultCode::Unknown(_)) {
         assert!(is_error(code), "raw value {}", raw);
         assert!(!is_non_error(code), "raw value {}", raw);
      }
   }
   assert!(is_error(ResultCode::from_raw(768)));
   assert!(is_error(ResultCode::from_raw(356)));
   assert!(is_error(ResultCode::from_raw(357)));
}

#[test]
fn non_error_codes_are_recognized() {
   assert!(!is_error(ResultCode::Ok));
   assert!(is_non_error(ResultCode::Ok));

   assert!(!is_error(ResultCode::Row));
   assert!(is_non_error(ResultCode::Row));

   assert!(!is_error(ResultCode::Done));
   assert!(is_non_error(ResultCode::Done));

   assert!(!is_error(ResultCode::OkLoadPermanently));
   assert!(is_non_error(ResultCode::OkLoadPermanently));

   assert!(!is_error(ResultCode::OkSymlink));
   assert!(is_non_error(ResultCode::OkSymlink));
}

#[test]
fn error_codes_are_recognized() {
   assert!(is_error(ResultCode::Error));
   assert!(!is_non_error(ResultCode::Error));

   assert!(is_error(ResultCode::IoErrRead));
   assert!(!is_non_error(ResultCode::IoErrRead));

   assert!(is_error(ResultCode::Notice));
   assert!(is_error(ResultCode::WarningAutoIndex));
}

// ─── Primary codes ───

#[test]
fn primary_result_of_extended_codes() {
   assert_eq!(primary_result(ResultCode::Ok), ResultCode::Ok);
   assert_eq!(primary_result(ResultCode::OkLoadPermanently), ResultCode::Ok);
   assert_eq!(primary_result(ResultCode::ErrorRetry), ResultCode::Error);
   assert_eq!(primary_result(ResultCode::BusySnapshot), ResultCode::Busy);
   assert_eq!(
      primary_result(ResultCode::CantOpenIsDir),
      ResultCode::CantOpen
   );
}

#[test]
fn primary_result_is_idempotent() {
   for &code in ResultCode::ALL {
      let once = primary_result(code);
      assert_eq!(primary_result(once), once, "{}", code.name());
   }
   for raw in -300..=9000 {
      let once = primary_result(ResultCode::from_raw(raw));
      assert_eq!(primary_result(once), once, "raw value {}", raw);
   }
}

#[test]
fn table_matches_engine_constants() {
   assert_eq!(ResultCode::Ok.raw(), ffi::SQLITE_OK);
   assert_eq!(ResultCode::Misuse.raw(), ffi::SQLITE_MISUSE);
   assert_eq!(ResultCode::Row.raw(), ffi::SQLITE_ROW);
   assert_eq!(ResultCode::Done.raw(), ffi::SQLITE_DONE);
   assert_eq!(ResultCode::ConstraintUnique.raw(), ffi::SQLITE_CONSTRAINT_UNIQUE);
   assert_eq!(ResultCode::IoErrRead.raw(), ffi::SQLITE_IOERR_READ);
}

// ─── Diagnostic strings ───

#[test]
fn errstr_is_the_engine_string() {
   let expected = unsafe { ffi::sqlite3_errstr(ffi::SQLITE_NOMEM) };
   assert_eq!(ResultCode::NoMem.errstr_cstr().as_ptr(), expected);
   assert_eq!(errstr(ResultCode::NoMem), "out of memory");
}

#[test]
fn errstr_is_stable_across_calls() {
   for &code in ResultCode::ALL {
      assert_eq!(code.errstr(), code.errstr());
      assert!(!code.errstr().is_empty());
   }
}

#[test]
fn errstr_for_unknown_code_does_not_fail() {
   assert_eq!(errstr(ResultCode::from_raw(4242)), "unknown error");
}
