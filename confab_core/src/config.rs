//! Compile-time relay configuration.
//!
//! The source this relay is modeled on hard-codes these values, and so do we (see
//! the open question in `DESIGN.md` about runtime configurability). Keeping them as
//! `const`s rather than threading a config struct through every constructor means
//! every module that cares can just `use confab_core::config::*` instead of
//! plumbing a reference everywhere.

use core::time::Duration;

/// TCP port the relay listens on.
pub const LISTEN_PORT: u16 = 9797;

/// Maximum number of frames held per client before the drop-oldest policy kicks in.
pub const QUEUE_CAPACITY: usize = 50;

/// The mixer's tick period.
pub const MIX_PERIOD: Duration = Duration::from_millis(20);

/// Send/receive socket buffer size applied to every accepted connection.
pub const SOCKET_BUFFER_BYTES: usize = 32 * 1024;
