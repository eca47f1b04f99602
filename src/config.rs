//! Configuration for opening connections and preparing statements

use std::ffi::{c_int, c_uint};
use std::ops::{BitOr, BitOrAssign};
use std::time::Duration;

use serde::Deserialize;

/// Flags passed to `sqlite3_open_v2`.
///
/// Values match <https://www.sqlite.org/c3ref/c_open_autoproxy.html>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct OpenFlags(c_int);

impl OpenFlags {
   pub const READ_ONLY: Self = Self(0x0000_0001);
   pub const READ_WRITE: Self = Self(0x0000_0002);
   pub const CREATE: Self = Self(0x0000_0004);
   /// Interpret the filename as a URI.
   pub const URI: Self = Self(0x0000_0040);
   /// Open a purely in-memory database.
   pub const MEMORY: Self = Self(0x0000_0080);
   pub const NO_MUTEX: Self = Self(0x0000_8000);
   pub const FULL_MUTEX: Self = Self(0x0001_0000);
   pub const SHARED_CACHE: Self = Self(0x0002_0000);
   pub const PRIVATE_CACHE: Self = Self(0x0004_0000);
   /// Refuse to open a database file that is a symbolic link.
   pub const NO_FOLLOW: Self = Self(0x0100_0000);
   /// Enable extended result codes for the new connection.
   pub const EXTENDED_RESULT_CODES: Self = Self(0x0200_0000);

   pub const fn empty() -> Self {
      Self(0)
   }

   pub const fn from_bits(bits: c_int) -> Self {
      Self(bits)
   }

   pub const fn bits(self) -> c_int {
      self.0
   }

   pub const fn contains(self, other: Self) -> bool {
      self.0 & other.0 == other.0
   }
}

impl Default for OpenFlags {
   fn default() -> Self {
      Self::READ_WRITE | Self::CREATE
   }
}

impl BitOr for OpenFlags {
   type Output = Self;

   fn bitor(self, rhs: Self) -> Self {
      Self(self.0 | rhs.0)
   }
}

impl BitOrAssign for OpenFlags {
   fn bitor_assign(&mut self, rhs: Self) {
      self.0 |= rhs.0;
   }
}

/// Flags passed to `sqlite3_prepare_v3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct PrepareFlags(c_uint);

impl PrepareFlags {
   /// Hint that the statement will be retained and reused many times.
   pub const PERSISTENT: Self = Self(0x01);
   /// No-op, kept for parity with the C API.
   pub const NORMALIZE: Self = Self(0x02);
   /// Fail to prepare statements that use virtual tables.
   pub const NO_VTAB: Self = Self(0x04);

   pub const fn empty() -> Self {
      Self(0)
   }

   pub const fn bits(self) -> c_uint {
      self.0
   }

   pub const fn contains(self, other: Self) -> bool {
      self.0 & other.0 == other.0
   }
}

impl BitOr for PrepareFlags {
   type Output = Self;

   fn bitor(self, rhs: Self) -> Self {
      Self(self.0 | rhs.0)
   }
}

/// Access mode requested when opening a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
   ReadOnly,
   ReadWrite,
   /// Open for reading and writing, creating the file if it does not exist.
   #[default]
   ReadWriteCreate,
}

/// Threading mode requested for a single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threading {
   /// Use whatever the engine was compiled or configured with.
   #[default]
   Default,
   /// Multi-thread mode: the connection must not be shared between threads.
   NoMutex,
   /// Serialized mode.
   FullMutex,
}

/// Configuration for [`Connection::open_with`](crate::Connection::open_with)
///
/// # Examples
///
/// ```
/// use sqlite_typed::{OpenConfig, OpenMode};
/// use std::time::Duration;
///
/// // Use defaults
/// let config = OpenConfig::default();
///
/// // Override just what you need
/// let config = OpenConfig {
///     mode: OpenMode::ReadOnly,
///     busy_timeout: Some(Duration::from_secs(5)),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OpenConfig {
   /// Default: read-write, create if missing
   pub mode: OpenMode,

   /// Interpret the path as a `file:` URI.
   ///
   /// Default: false
   pub uri: bool,

   /// Keep the database purely in memory regardless of the path.
   ///
   /// Default: false
   pub memory: bool,

   /// Default: [`Threading::Default`]
   pub threading: Threading,

   /// Name of the VFS module to use, or `None` for the default VFS.
   pub vfs: Option<String>,

   /// Installs a busy handler that sleeps and retries for up to this long
   /// when a table is locked.
   ///
   /// Default: none (busy connections fail immediately with `SQLITE_BUSY`)
   pub busy_timeout: Option<Duration>,

   /// Report extended result codes (`SQLITE_CONSTRAINT_UNIQUE` rather than
   /// `SQLITE_CONSTRAINT`) from every call on the connection.
   ///
   /// Default: false, matching the engine
   pub extended_result_codes: bool,
}

impl Default for OpenConfig {
   fn default() -> Self {
      Self {
         mode: OpenMode::ReadWriteCreate,
         uri: false,
         memory: false,
         threading: Threading::Default,
         vfs: None,
         busy_timeout: None,
         extended_result_codes: false,
      }
   }
}

impl OpenConfig {
   /// The `sqlite3_open_v2` flags described by this configuration.
   pub fn flags(&self) -> OpenFlags {
      let mut flags = match self.mode {
         OpenMode::ReadOnly => OpenFlags::READ_ONLY,
         OpenMode::ReadWrite => OpenFlags::READ_WRITE,
         OpenMode::ReadWriteCreate => OpenFlags::READ_WRITE | OpenFlags::CREATE,
      };

      if self.uri {
         flags |= OpenFlags::URI;
      }
      if self.memory {
         flags |= OpenFlags::MEMORY;
      }

      match self.threading {
         Threading::Default => {}
         Threading::NoMutex => flags |= OpenFlags::NO_MUTEX,
         Threading::FullMutex => flags |= OpenFlags::FULL_MUTEX,
      }

      if self.extended_result_codes {
         flags |= OpenFlags::EXTENDED_RESULT_CODES;
      }

      flags
   }
}
