//! The relay's transport-independent core: client bookkeeping, the mixer,
//! and the acceptor/lifecycle controller that ties them together over TCP.

pub mod client;
pub mod config;
pub mod egress;
pub mod frame;
pub mod inbox;
pub mod ingress;
pub mod mixer;
pub mod registry;
pub mod server;

pub use client::{ClientEntry, ClientId};
pub use frame::{mix_frames, SharedFrame};
pub use inbox::Inbox;
pub use registry::Registry;
