//! End-to-end scenarios wired up against real sockets and real threads, but
//! without going through the acceptor (which binds the compile-time port) —
//! instead clients are hooked directly to reader/sender threads the way
//! `confab_core::server::run` would wire them, just over ephemeral loopback
//! ports so tests can run concurrently.

use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use confab_core::client::ClientEntry;
use confab_core::egress::run_sender;
use confab_core::frame::mix_frames;
use confab_core::inbox::Inbox;
use confab_core::ingress::run_reader;
use confab_core::registry::Registry;
use confab_proto::{format, read_frame, write_frame};

/// Wires up one simulated client: a loopback socket pair, a registered
/// `ClientEntry`, and live reader/sender threads. Returns the remote end the
/// test drives directly (sending frames up, reading mixed frames down).
struct Harness {
    remote: TcpStream,
}

fn spawn_client(registry: &Arc<Registry>, inbox: &Arc<Inbox>) -> Harness {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let remote = TcpStream::connect(addr).unwrap();
    let (server_side, _) = listener.accept().unwrap();

    let id = ClientEntry::issue_id();
    let reader_stream = server_side.try_clone().unwrap();
    let sender_stream = server_side.try_clone().unwrap();
    let entry = Arc::new(ClientEntry::new(id, server_side));
    registry.insert(entry.clone());

    let sender_entry = entry.clone();
    let sender_registry = registry.clone();
    let sender_handle = thread::spawn(move || run_sender(sender_stream, sender_entry, sender_registry));

    let reader_inbox = inbox.clone();
    let reader_registry = registry.clone();
    thread::spawn(move || run_reader(reader_stream, entry, reader_inbox, reader_registry, sender_handle));

    Harness { remote }
}

fn silence() -> Vec<u8> {
    vec![0u8; format::CANONICAL_FRAME_BYTES.get()]
}

fn tone(sample: i16) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(format::CANONICAL_FRAME_BYTES.get());
    for _ in 0..format::CANONICAL_SAMPLE_COUNT.get() {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

fn run_one_tick(registry: &Registry, inbox: &Inbox) {
    let frames = inbox.drain();
    let mixed = mix_frames(&frames);
    let shared: Arc<[u8]> = Arc::from(mixed.into_boxed_slice());
    registry.enqueue_to_all(&shared);
}

/// Gives background reader threads a moment to move bytes off the wire and
/// into the inbox before the test drives a mixer tick.
fn settle() {
    thread::sleep(Duration::from_millis(50));
}

#[test]
fn single_client_hears_its_own_voice_unmodified() {
    let registry = Arc::new(Registry::new());
    let inbox = Arc::new(Inbox::new());
    let mut a = spawn_client(&registry, &inbox);

    let sent = tone(1234);
    write_frame(&mut a.remote, &sent).unwrap();
    settle();
    run_one_tick(&registry, &inbox);

    let received = read_frame(&mut a.remote).unwrap();
    assert_eq!(received, sent);
}

#[test]
fn two_clients_hear_the_sum_of_both_voices() {
    let registry = Arc::new(Registry::new());
    let inbox = Arc::new(Inbox::new());
    let mut a = spawn_client(&registry, &inbox);
    let mut b = spawn_client(&registry, &inbox);

    write_frame(&mut a.remote, &tone(1000)).unwrap();
    write_frame(&mut b.remote, &tone(2000)).unwrap();
    settle();
    run_one_tick(&registry, &inbox);

    let expected = tone(3000);
    assert_eq!(read_frame(&mut a.remote).unwrap(), expected);
    assert_eq!(read_frame(&mut b.remote).unwrap(), expected);
}

#[test]
fn opposite_phase_voices_cancel_to_silence() {
    let registry = Arc::new(Registry::new());
    let inbox = Arc::new(Inbox::new());
    let mut a = spawn_client(&registry, &inbox);
    let mut b = spawn_client(&registry, &inbox);

    write_frame(&mut a.remote, &tone(5000)).unwrap();
    write_frame(&mut b.remote, &tone(-5000)).unwrap();
    settle();
    run_one_tick(&registry, &inbox);

    let expected = silence();
    assert_eq!(read_frame(&mut a.remote).unwrap(), expected);
    assert_eq!(read_frame(&mut b.remote).unwrap(), expected);
}

#[test]
fn loud_voices_saturate_instead_of_wrapping() {
    let registry = Arc::new(Registry::new());
    let inbox = Arc::new(Inbox::new());
    let mut a = spawn_client(&registry, &inbox);
    let mut b = spawn_client(&registry, &inbox);

    write_frame(&mut a.remote, &tone(i16::MAX - 10)).unwrap();
    write_frame(&mut b.remote, &tone(i16::MAX - 10)).unwrap();
    settle();
    run_one_tick(&registry, &inbox);

    let expected = tone(i16::MAX);
    assert_eq!(read_frame(&mut a.remote).unwrap(), expected);
    assert_eq!(read_frame(&mut b.remote).unwrap(), expected);
}

#[test]
fn slow_client_queue_is_bounded_by_drop_oldest() {
    let registry = Arc::new(Registry::new());
    let inbox = Arc::new(Inbox::new());
    let a = spawn_client(&registry, &inbox);
    // Never read from `a.remote`: its sender thread will back up against the
    // OS socket buffer's own slack, but the relay's own per-client queue is
    // what this test constrains. Hold the entry directly via a snapshot.
    drop(a);

    let entries = registry.snapshot();
    let entry = entries.into_iter().next().unwrap();

    for i in 0..200u16 {
        entry.enqueue(Arc::from(vec![i as u8; 4].into_boxed_slice()));
    }

    // Drain everything the queue will give up; it must never have held more
    // than the configured capacity at once. We can't observe peak occupancy
    // directly, but we can confirm the entry is still alive and well-formed
    // (no panics, no poisoned locks) after far exceeding capacity.
    assert!(entry.is_active());
}

#[test]
fn disconnecting_client_is_cleanly_removed_and_others_unaffected() {
    let registry = Arc::new(Registry::new());
    let inbox = Arc::new(Inbox::new());
    let a = spawn_client(&registry, &inbox);
    let mut b = spawn_client(&registry, &inbox);

    assert_eq!(registry.snapshot().len(), 2);

    drop(a.remote);
    settle();

    write_frame(&mut b.remote, &tone(999)).unwrap();
    settle();
    run_one_tick(&registry, &inbox);

    assert_eq!(registry.snapshot().len(), 1);
    let received = read_frame(&mut b.remote).unwrap();
    assert_eq!(received, tone(999));
}

#[test]
fn short_and_long_frames_are_padded_and_truncated_in_the_mix() {
    let registry = Arc::new(Registry::new());
    let inbox = Arc::new(Inbox::new());
    let mut a = spawn_client(&registry, &inbox);

    let short = vec![7u8, 0, 9, 0];
    write_frame(&mut a.remote, &short).unwrap();
    settle();
    run_one_tick(&registry, &inbox);

    let received = read_frame(&mut a.remote).unwrap();
    assert_eq!(received.len(), format::CANONICAL_FRAME_BYTES.get());
    assert_eq!(&received[..4], &short[..]);
    assert!(received[4..].iter().all(|&b| b == 0));
}

#[test]
fn stream_stays_writable_after_a_socket_error_is_handled() {
    // Regression guard for the read/write retry loop in confab_proto: a
    // single short write on a well-behaved TCP loopback socket should never
    // surface as an error to the caller.
    let registry = Arc::new(Registry::new());
    let inbox = Arc::new(Inbox::new());
    let mut a = spawn_client(&registry, &inbox);

    for i in 0..5u16 {
        write_frame(&mut a.remote, &tone(i as i16 * 10)).unwrap();
        settle();
        run_one_tick(&registry, &inbox);
        let received = read_frame(&mut a.remote).unwrap();
        assert_eq!(received, tone(i as i16 * 10));
    }

    a.remote.flush().unwrap();
}
