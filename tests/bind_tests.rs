//! Integration tests for the Bind table: each supported Rust type is bound,
//! selected back and read through the matching column type.

use std::ffi::{CStr, CString};

use sqlite_typed::{
   Bind, Blob, Connection, Datatype, Null, ResultCode, Skip, Statement, Text, bind,
};

fn init_tracing() {
   let _ = tracing_subscriber::fmt()
      .with_max_level(tracing::Level::TRACE)
      .with_test_writer()
      .try_init();
}

fn setup_db() -> Connection {
   init_tracing();
   Connection::open_memory().unwrap()
}

/// Binds `value` to `SELECT ?1` and steps to the single row.
fn echo<'c>(db: &'c Connection, value: &dyn Bind) -> Statement<'c> {
   let mut stmt = Statement::new(db, "SELECT ?1").unwrap();
   assert_eq!(stmt.bind(1, value), ResultCode::Ok);
   assert!(stmt.try_step().unwrap());
   stmt
}

// ─── Integers ───

#[test]
fn test_i32_round_trip() {
   let db = setup_db();
   let stmt = echo(&db, &234);
   assert_eq!(stmt.column_type(0), Datatype::Integer);
   assert_eq!(stmt.get::<i32>(0), 234);
}

#[test]
fn test_narrow_integers_round_trip() {
   let db = setup_db();
   assert_eq!(echo(&db, &-7i8).get::<i8>(0), -7);
   assert_eq!(echo(&db, &i16::MIN).get::<i16>(0), i16::MIN);
   assert_eq!(echo(&db, &u8::MAX).get::<u8>(0), u8::MAX);
   assert_eq!(echo(&db, &u16::MAX).get::<u16>(0), u16::MAX);
}

#[test]
fn test_wide_integers_round_trip() {
   let db = setup_db();
   assert_eq!(echo(&db, &i64::MIN).get::<i64>(0), i64::MIN);
   assert_eq!(echo(&db, &u32::MAX).get::<u32>(0), u32::MAX);
   assert_eq!(echo(&db, &u32::MAX).get::<i64>(0), i64::from(u32::MAX));
   assert_eq!(echo(&db, &-3isize).get::<isize>(0), -3);
   assert_eq!(echo(&db, &12usize).get::<usize>(0), 12);
}

#[test]
fn test_u64_above_i64_max_is_reinterpreted() {
   let db = setup_db();
   let stmt = echo(&db, &u64::MAX);
   assert_eq!(stmt.get::<u64>(0), u64::MAX);
   assert_eq!(stmt.get::<i64>(0), -1);
}

#[test]
fn test_bool_binds_as_int() {
   let db = setup_db();
   let stmt = echo(&db, &true);
   assert_eq!(stmt.column_type(0), Datatype::Integer);
   assert_eq!(stmt.column_int(0), 1);
   assert!(stmt.get::<bool>(0));
   assert!(!echo(&db, &false).get::<bool>(0));
}

// ─── Floats ───

#[test]
fn test_f64_round_trip_is_exact() {
   let db = setup_db();
   for value in [0.1 + 0.2, 1e300, -2.5e-308, f64::MAX] {
      let stmt = echo(&db, &value);
      assert_eq!(stmt.column_type(0), Datatype::Float);
      assert_eq!(stmt.get::<f64>(0).to_bits(), value.to_bits());
   }
}

#[test]
fn test_f32_widens_to_double() {
   let db = setup_db();
   let stmt = echo(&db, &1.5f32);
   assert_eq!(stmt.column_type(0), Datatype::Float);
   assert_eq!(stmt.get::<f32>(0), 1.5);
   assert_eq!(stmt.get::<f64>(0), 1.5);
}

// ─── Text ───

#[test]
fn test_text_types_round_trip() {
   let db = setup_db();
   assert_eq!(echo(&db, &"héllo").get::<String>(0), "héllo");
   assert_eq!(echo(&db, &String::from("owned")).get::<String>(0), "owned");
   assert_eq!(echo(&db, &'ß').get::<String>(0), "ß");
   assert_eq!(echo(&db, &c"terminated").get::<String>(0), "terminated");
   assert_eq!(
      echo(&db, &CString::new("c string").unwrap()).get::<String>(0),
      "c string"
   );
   assert_eq!(echo(&db, &Text::new("view")).get::<String>(0), "view");
}

#[test]
fn test_text_types_read_back_as_themselves() {
   let db = setup_db();
   assert_eq!(echo(&db, &'ß').get::<char>(0), 'ß');
   assert_eq!(echo(&db, &'x').get::<char>(0), 'x');
   assert_eq!(echo(&db, &"").get::<char>(0), '\0');
   assert_eq!(echo(&db, &c"terminated").get::<CString>(0).as_c_str(), c"terminated");

   let owned = CString::new("c string").unwrap();
   assert_eq!(echo(&db, &owned).get::<CString>(0), owned);
   assert_eq!(echo(&db, &"a\0b").get::<CString>(0).as_c_str(), c"a");
}

#[test]
fn test_text_view_borrows_column() {
   let db = setup_db();
   let stmt = echo(&db, &"borrowed");
   let text: Text = stmt.get(0);
   assert_eq!(text.as_str(), Ok("borrowed"));
   assert_eq!(stmt.column_type(0), Datatype::Text);
}

#[test]
fn test_empty_text_is_not_null() {
   let db = setup_db();
   let stmt = echo(&db, &"");
   assert_eq!(stmt.column_type(0), Datatype::Text);
   assert_eq!(stmt.get::<String>(0), "");
}

#[test]
fn test_unsized_str_binds_directly() {
   let db = setup_db();
   let mut stmt = Statement::new(&db, "SELECT ?1").unwrap();
   let value: &str = "direct";
   assert_eq!(stmt.bind(1, value), ResultCode::Ok);
   let cstr: &CStr = c"ignored";
   assert_eq!(stmt.bind(1, cstr), ResultCode::Ok);
   assert_eq!(stmt.bind(1, value), ResultCode::Ok);
   assert!(stmt.try_step().unwrap());
   assert_eq!(stmt.column_str(0), Ok("direct"));
}

// ─── Blobs and sequences ───

#[test]
fn test_blob_round_trip() {
   let db = setup_db();
   let bytes = [0u8, 1, 0xfe, 0xff];
   let stmt = echo(&db, &Blob::new(&bytes));
   assert_eq!(stmt.column_type(0), Datatype::Blob);
   let blob: Blob = stmt.get(0);
   assert_eq!(blob.as_bytes(), &bytes);
}

#[test]
fn test_empty_blob_is_not_null() {
   let db = setup_db();
   let stmt = echo(&db, &Blob::new(&[]));
   assert_eq!(stmt.column_type(0), Datatype::Blob);
   assert_eq!(stmt.column_bytes(0), 0);
}

#[test]
fn test_vec_round_trips_as_blob() {
   let db = setup_db();
   let values = vec![1u64, 2, u64::MAX];
   let stmt = echo(&db, &values);
   assert_eq!(stmt.column_type(0), Datatype::Blob);
   assert_eq!(stmt.column_bytes(0), 24);
   assert_eq!(stmt.get::<Vec<u64>>(0), values);
}

#[test]
fn test_array_round_trips_as_blob() {
   let db = setup_db();
   let values = [0.25f32, -1.0, 3.5];
   let stmt = echo(&db, &values);
   assert_eq!(stmt.get::<[f32; 3]>(0), values);
}

#[test]
fn test_slice_binds_as_blob() {
   let db = setup_db();
   let values: &[i16] = &[-1, 0, 1];
   let mut stmt = Statement::new(&db, "SELECT ?1").unwrap();
   assert_eq!(stmt.bind(1, values), ResultCode::Ok);
   assert!(stmt.try_step().unwrap());
   assert_eq!(stmt.get::<Vec<i16>>(0), values);
}

#[test]
fn test_short_blob_fills_array_with_defaults() {
   let db = setup_db();
   let stmt = echo(&db, &[1u32, 2]);
   assert_eq!(stmt.get::<[u32; 4]>(0), [1, 2, 0, 0]);
   assert_eq!(stmt.get::<[u32; 1]>(0), [1]);
}

#[test]
fn test_zeroblob() {
   let db = setup_db();
   let mut stmt = Statement::new(&db, "SELECT ?1").unwrap();
   assert_eq!(stmt.bind_zeroblob(1, 8), ResultCode::Ok);
   assert!(stmt.try_step().unwrap());
   assert_eq!(stmt.get::<Vec<u8>>(0), vec![0u8; 8]);
}

// ─── Null, Skip and Option ───

#[test]
fn test_null_marker() {
   let db = setup_db();
   let stmt = echo(&db, &Null);
   assert_eq!(stmt.column_type(0), Datatype::Null);
   assert_eq!(stmt.get::<Option<i64>>(0), None);
}

#[test]
fn test_option_round_trip() {
   let db = setup_db();

   let none: Option<i32> = None;
   let stmt = echo(&db, &none);
   assert_eq!(stmt.column_type(0), Datatype::Null);
   assert_eq!(stmt.get::<Option<i32>>(0), None);

   let stmt = echo(&db, &Some(7));
   assert_eq!(stmt.column_type(0), Datatype::Integer);
   assert_eq!(stmt.get::<Option<i32>>(0), Some(7));

   let stmt = echo(&db, &Some("text"));
   assert_eq!(stmt.get::<Option<String>>(0).as_deref(), Some("text"));
}

#[test]
fn test_skip_leaves_slot_unbound() {
   let db = setup_db();
   let mut stmt = Statement::new(&db, "SELECT ?1, ?2").unwrap();
   assert_eq!(stmt.bind_int(1, 99), ResultCode::Ok);

   let (code, last) = stmt.bind_values(&(Skip, 5));
   assert_eq!(code, ResultCode::Ok);
   assert_eq!(last, 2);

   assert!(stmt.try_step().unwrap());
   assert_eq!(stmt.get::<i32>(0), 99);
   assert_eq!(stmt.get::<i32>(1), 5);
}

// ─── Multi-value binding ───

#[test]
fn test_bind_values_reports_last_slot() {
   let db = setup_db();
   db.execute_batch("CREATE TABLE t(a INTEGER, b REAL)").unwrap();

   let mut stmt = Statement::new(&db, "INSERT INTO t VALUES (?, ?)").unwrap();
   let (code, last) = bind(&stmt, &(17, 3.25));
   assert_eq!(code, ResultCode::Ok);
   assert_eq!(last, 2);
   assert_eq!(stmt.step(), ResultCode::Done);
}

#[test]
fn test_bind_values_stops_at_first_error() {
   let db = setup_db();
   let mut stmt = Statement::new(&db, "SELECT ?1").unwrap();

   let (code, last) = stmt.bind_values(&(1, 2, 3));
   assert_eq!(code, ResultCode::Range);
   assert_eq!(last, 1);

   assert!(stmt.try_step().unwrap());
   assert_eq!(stmt.get::<i32>(0), 1);
}

#[test]
fn test_bind_values_with_nothing() {
   let db = setup_db();
   let stmt = Statement::new(&db, "SELECT 1").unwrap();
   assert_eq!(stmt.bind_values(&()), (ResultCode::Ok, 0));
}

#[test]
fn test_bind_values_from_dyn_slice() {
   let db = setup_db();
   let mut stmt = Statement::new(&db, "SELECT ?1, ?2, ?3").unwrap();

   let values: [&dyn Bind; 3] = [&1, &"two", &Null];
   assert_eq!(stmt.bind_values(&values), (ResultCode::Ok, 3));
   assert_eq!(bind(&stmt, &values[..2]), (ResultCode::Ok, 2));

   assert!(stmt.try_step().unwrap());
   assert_eq!(stmt.get::<i32>(0), 1);
   assert_eq!(stmt.get::<String>(1), "two");
   assert_eq!(stmt.column_type(2), Datatype::Null);
}

#[test]
fn test_bind_values_twelve_columns() {
   let db = setup_db();
   let mut stmt = Statement::new(
      &db,
      "SELECT ?1 + ?2 + ?3 + ?4 + ?5 + ?6 + ?7 + ?8 + ?9 + ?10 + ?11 + ?12",
   )
   .unwrap();

   let values = (1, 2i8, 3i16, 4u8, 5u16, 6i64, 7u32, 8u64, 9usize, 10isize, true, 0.5);
   let (code, last) = stmt.bind_values(&values);
   assert_eq!(code, ResultCode::Ok);
   assert_eq!(last, 12);

   assert!(stmt.try_step().unwrap());
   assert_eq!(stmt.get::<f64>(0), 56.5);
}

// ─── Parameters ───

#[test]
fn test_named_parameter() {
   let db = setup_db();
   let mut stmt = Statement::new(&db, "SELECT :greeting || ', ' || :name").unwrap();

   let name = stmt.parameter_named(":name").unwrap();
   assert_eq!(name.index(), 2);
   assert_eq!(name.name(), Some(":name"));
   assert_eq!(name.bind(&"world"), ResultCode::Ok);

   let greeting = stmt.parameter(1);
   assert_eq!(greeting.bind_text(Text::new("hello")), ResultCode::Ok);
   assert!(stmt.parameter_named(":absent").is_none());

   assert!(stmt.try_step().unwrap());
   assert_eq!(stmt.column_str(0), Ok("hello, world"));
}

#[test]
fn test_parameter_forwards_primitives() {
   let db = setup_db();
   let mut stmt = Statement::new(&db, "SELECT ?1, ?2, ?3, ?4").unwrap();

   assert_eq!(stmt.parameter(1).bind_int(5), ResultCode::Ok);
   assert_eq!(stmt.parameter(2).bind_double(0.5), ResultCode::Ok);
   assert_eq!(stmt.parameter(3).bind_blob(Blob::new(b"ab")), ResultCode::Ok);
   assert_eq!(stmt.parameter(4).bind_null(), ResultCode::Ok);
   assert_eq!(stmt.parameter(5).bind_int64(1), ResultCode::Range);

   assert!(stmt.try_step().unwrap());
   assert_eq!(stmt.get::<i32>(0), 5);
   assert_eq!(stmt.get::<f64>(1), 0.5);
   assert_eq!(stmt.get::<Vec<u8>>(2), b"ab");
   assert_eq!(stmt.column_type(3), Datatype::Null);
}
