//! Binds the listening socket, accepts clients, and drives the relay's
//! lifecycle from startup through a clean, joined shutdown.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use socket2::{Domain, Socket, Type};

use crate::client::ClientEntry;
use crate::config::{LISTEN_PORT, SOCKET_BUFFER_BYTES};
use crate::egress::run_sender;
use crate::inbox::Inbox;
use crate::ingress::run_reader;
use crate::mixer::run_mixer;
use crate::registry::Registry;

/// Binds a `TcpListener` on [`LISTEN_PORT`] with `SO_REUSEADDR` set before
/// bind, which `std::net::TcpListener` has no portable way to request —
/// hence going through `socket2` to build the socket by hand and converting
/// it into a `std::net::TcpListener` at the end.
fn bind_listener() -> io::Result<TcpListener> {
    let addr: SocketAddr = ([0, 0, 0, 0], LISTEN_PORT).into();
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;
    Ok(socket.into())
}

/// Applies the relay's per-connection socket tuning: disables Nagle (voice
/// frames are small and latency-sensitive, not throughput-bound) and sizes
/// the kernel send/recv buffers explicitly rather than trusting the platform
/// default.
fn tune_socket(stream: &TcpStream) -> io::Result<()> {
    stream.set_nodelay(true)?;
    // `try_clone` dups the descriptor, so the `Socket` wrapper owns its own
    // handle and closes only that dup when it drops at the end of this scope.
    let socket = Socket::from(stream.try_clone()?);
    socket.set_send_buffer_size(SOCKET_BUFFER_BYTES)?;
    socket.set_recv_buffer_size(SOCKET_BUFFER_BYTES)?;
    Ok(())
}

/// Runs the relay until `shutdown` is observed set, then tears everything
/// down in order: stop accepting, join every reader (which transitively
/// joins its sender), join the mixer, drop the listener.
pub fn run(shutdown: Arc<AtomicBool>) -> io::Result<()> {
    let listener = bind_listener()?;
    listener.set_nonblocking(true)?;
    log::info!("listening on port {LISTEN_PORT}");

    let registry = Arc::new(Registry::new());
    let inbox = Arc::new(Inbox::new());

    let mixer_handle: JoinHandle<()> = {
        let inbox = inbox.clone();
        let registry = registry.clone();
        let shutdown = shutdown.clone();
        thread::spawn(move || run_mixer(inbox, registry, shutdown))
    };

    let mut reader_handles = Vec::new();

    while !shutdown.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((stream, addr)) => {
                if let Err(e) = tune_socket(&stream) {
                    log::warn!("failed to tune socket for {addr}: {e}");
                }
                log::info!("accepted client {addr}");
                reader_handles.push(spawn_client(stream, registry.clone(), inbox.clone()));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(std::time::Duration::from_millis(50));
            }
            Err(e) => {
                log::warn!("accept failed: {e}");
            }
        }
    }

    log::info!("shutting down");

    for entry in registry.snapshot() {
        registry.remove(&entry);
    }
    for handle in reader_handles {
        if let Err(panic) = handle.join() {
            log::warn!("reader thread panicked: {panic:?}");
        }
    }
    if let Err(panic) = mixer_handle.join() {
        log::warn!("mixer thread panicked: {panic:?}");
    }

    Ok(())
}

/// Spawns the reader and sender threads for one newly accepted client and
/// registers it, returning the reader's handle (which owns, and will join,
/// the sender's handle in turn).
fn spawn_client(stream: TcpStream, registry: Arc<Registry>, inbox: Arc<Inbox>) -> JoinHandle<()> {
    let id = ClientEntry::issue_id();
    let reader_stream = stream.try_clone().expect("tcp stream clone");
    let sender_stream = stream.try_clone().expect("tcp stream clone");

    let entry = Arc::new(ClientEntry::new(id, stream));
    registry.insert(entry.clone());

    let sender_handle = {
        let entry = entry.clone();
        let registry = registry.clone();
        thread::spawn(move || run_sender(sender_stream, entry, registry))
    };

    thread::spawn(move || run_reader(reader_stream, entry, inbox, registry, sender_handle))
}
