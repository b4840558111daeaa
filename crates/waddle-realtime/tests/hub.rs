//! Registry, broadcast, and connection lifecycle behavior of the hub.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::channel::mpsc as fmpsc;
use futures::{Sink, StreamExt};

use waddle_core::config::RealtimeConfig;
use waddle_core::types::Identity;
use waddle_realtime::{ClientHandle, Hub, Inbound, PumpExit};

async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition was not reached in time");
}

async fn connected(hub: &Hub, identity: &Identity) {
    eventually(|| async move { hub.is_connected(identity).await }).await;
}

async fn disconnected(hub: &Hub, identity: &Identity) {
    eventually(|| async move { !hub.is_connected(identity).await }).await;
}

fn hub() -> Hub {
    Hub::spawn(&RealtimeConfig::default())
}

/// A transport sink that records whether it was closed gracefully.
#[derive(Clone, Default)]
struct ClosingSink {
    closed: Arc<AtomicBool>,
}

impl Sink<String> for ClosingSink {
    type Error = std::io::Error;

    fn poll_ready(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, _: String) -> Result<(), Self::Error> {
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.closed.store(true, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn duplicate_registration_keeps_one_entry() {
    let hub = hub();
    let id = Identity::new("user_1");

    let (first, mut first_rx) = ClientHandle::new(id.clone(), 4);
    hub.register(first).await.unwrap();
    connected(&hub, &id).await;

    let (second, mut second_rx) = ClientHandle::new(id.clone(), 4);
    hub.register(second).await.unwrap();

    // The replaced client's channel is closed.
    assert_eq!(first_rx.recv().await, None);
    assert_eq!(hub.client_count().await, 1);

    assert!(hub.send_to(&id, "hello").await);
    assert_eq!(second_rx.recv().await.as_deref(), Some("hello"));
}

#[tokio::test]
async fn slow_consumer_is_evicted_after_its_capacity() {
    let hub = hub();
    let id = Identity::new("user_7");

    let (client, mut rx) = ClientHandle::new(id.clone(), 2);
    hub.register(client).await.unwrap();
    connected(&hub, &id).await;

    for n in 0..5 {
        hub.broadcast(format!("m{n}")).await.unwrap();
    }
    disconnected(&hub, &id).await;

    assert!(!hub.send_to(&id, "late").await);

    let mut received = Vec::new();
    while let Some(msg) = rx.recv().await {
        received.push(msg);
    }
    assert_eq!(received, vec!["m0", "m1"]);
    assert_eq!(hub.metrics().snapshot().evictions, 1);
}

#[tokio::test]
async fn evicted_client_gets_no_pending_direct_message() {
    let hub = hub();
    let id = Identity::new("user_7");

    let (client, mut rx) = ClientHandle::new(id.clone(), 1);
    hub.register(client).await.unwrap();
    connected(&hub, &id).await;

    hub.broadcast("m0").await.unwrap();
    let hub_ref = &hub;
    eventually(|| async move { hub_ref.metrics().snapshot().messages_broadcast == 1 }).await;

    // The buffer is full, so this waits.
    let direct = {
        let hub = hub.clone();
        let id = id.clone();
        tokio::spawn(async move { hub.send_to(&id, "direct").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!direct.is_finished());

    hub.broadcast("m1").await.unwrap();
    disconnected(&hub, &id).await;

    assert!(!direct.await.unwrap());

    let mut received = Vec::new();
    while let Some(msg) = rx.recv().await {
        received.push(msg);
    }
    assert_eq!(received, vec!["m0"]);
    assert_eq!(hub.metrics().snapshot().evictions, 1);
    assert_eq!(hub.metrics().snapshot().direct_messages, 0);
}

#[tokio::test]
async fn send_to_waits_for_space_and_only_blocks_its_caller() {
    let hub = hub();
    let full = Identity::new("user_full");
    let other = Identity::new("user_other");

    let (full_client, mut full_rx) = ClientHandle::new(full.clone(), 1);
    let (other_client, mut other_rx) = ClientHandle::new(other.clone(), 8);
    hub.register(full_client).await.unwrap();
    hub.register(other_client).await.unwrap();
    connected(&hub, &full).await;
    connected(&hub, &other).await;

    assert!(hub.send_to(&full, "d0").await);

    let mut pending = {
        let hub = hub.clone();
        let full = full.clone();
        tokio::spawn(async move { hub.send_to(&full, "d1").await })
    };
    let waited = tokio::time::timeout(Duration::from_millis(100), &mut pending).await;
    assert!(waited.is_err(), "send_to must wait while the buffer is full");

    // Other recipients are unaffected.
    let sent = tokio::time::timeout(Duration::from_secs(1), hub.send_to(&other, "x")).await;
    assert!(sent.unwrap());
    assert_eq!(other_rx.recv().await.as_deref(), Some("x"));

    // Draining one frame lets the waiting send through.
    assert_eq!(full_rx.recv().await.as_deref(), Some("d0"));
    let done = tokio::time::timeout(Duration::from_secs(1), &mut pending).await;
    assert!(done.unwrap().unwrap());
    assert_eq!(full_rx.recv().await.as_deref(), Some("d1"));
    assert!(hub.is_connected(&full).await);
}

#[tokio::test]
async fn broadcast_is_not_stalled_by_a_waiting_send_to() {
    let hub = hub();
    let full = Identity::new("user_full");
    let other = Identity::new("user_other");

    let (full_client, _full_rx) = ClientHandle::new(full.clone(), 1);
    let (other_client, mut other_rx) = ClientHandle::new(other.clone(), 8);
    hub.register(full_client).await.unwrap();
    hub.register(other_client).await.unwrap();
    connected(&hub, &full).await;
    connected(&hub, &other).await;

    assert!(hub.send_to(&full, "d0").await);
    let pending = {
        let hub = hub.clone();
        let full = full.clone();
        tokio::spawn(async move { hub.send_to(&full, "d1").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!pending.is_finished());

    tokio::time::timeout(Duration::from_secs(1), hub.broadcast("all"))
        .await
        .expect("broadcast must not wait on a full client")
        .unwrap();
    let got = tokio::time::timeout(Duration::from_secs(1), other_rx.recv()).await;
    assert_eq!(got.unwrap().as_deref(), Some("all"));

    // The full client was evicted, which also releases the waiting caller.
    disconnected(&hub, &full).await;
    let released = tokio::time::timeout(Duration::from_secs(1), pending).await;
    assert!(!released.unwrap().unwrap());
}

#[tokio::test]
async fn eviction_does_not_affect_other_clients() {
    let hub = hub();
    let slow = Identity::new("user_slow");
    let fast = Identity::new("user_fast");

    let (slow_client, _slow_rx) = ClientHandle::new(slow.clone(), 1);
    let (fast_client, mut fast_rx) = ClientHandle::new(fast.clone(), 16);
    hub.register(slow_client).await.unwrap();
    hub.register(fast_client).await.unwrap();
    connected(&hub, &slow).await;
    connected(&hub, &fast).await;

    for n in 0..3 {
        hub.broadcast(format!("m{n}")).await.unwrap();
    }
    disconnected(&hub, &slow).await;

    for n in 0..3 {
        assert_eq!(fast_rx.recv().await, Some(format!("m{n}")));
    }
    assert!(hub.is_connected(&fast).await);
}

#[tokio::test]
async fn send_to_unknown_identity_is_a_no_op() {
    let hub = hub();
    assert!(!hub.send_to(&Identity::new("user_nobody"), "hi").await);
    assert_eq!(hub.client_count().await, 0);
}

#[tokio::test]
async fn stale_unregister_leaves_current_client() {
    let hub = hub();
    let id = Identity::new("user_1");
    let marker_id = Identity::new("user_marker");

    let (marker, _marker_rx) = ClientHandle::new(marker_id.clone(), 4);
    let (old, _old_rx) = ClientHandle::new(id.clone(), 4);
    let (current, mut current_rx) = ClientHandle::new(id.clone(), 4);
    hub.register(marker.clone()).await.unwrap();
    hub.register(old.clone()).await.unwrap();
    hub.register(current.clone()).await.unwrap();
    let (hub_ref, id_ref, current_id) = (&hub, &id, current.id);
    eventually(|| async move { hub_ref.connection_id(id_ref).await == Some(current_id) }).await;
    connected(&hub, &marker_id).await;

    // Requests on one channel are served in order, so once the marker is
    // gone the stale request has been handled too.
    hub.unregister(&old).await.unwrap();
    hub.unregister(&marker).await.unwrap();
    disconnected(&hub, &marker_id).await;
    assert_eq!(hub.connection_id(&id).await, Some(current.id));

    hub.broadcast("still here").await.unwrap();
    assert_eq!(current_rx.recv().await.as_deref(), Some("still here"));

    hub.unregister(&current).await.unwrap();
    disconnected(&hub, &id).await;
}

#[tokio::test]
async fn attached_connection_receives_broadcasts_until_peer_closes() {
    let hub = hub();
    let id = Identity::new("user_1");

    let (inbound_tx, inbound_rx) = fmpsc::unbounded::<Result<Inbound, std::io::Error>>();
    let (outbound_tx, mut outbound_rx) = fmpsc::unbounded::<String>();

    let task = {
        let hub = hub.clone();
        let id = id.clone();
        tokio::spawn(async move { hub.attach(id, inbound_rx, outbound_tx).await })
    };
    connected(&hub, &id).await;

    hub.broadcast("one").await.unwrap();
    assert_eq!(outbound_rx.next().await.as_deref(), Some("one"));
    assert!(hub.send_to(&id, "two").await);
    assert_eq!(outbound_rx.next().await.as_deref(), Some("two"));

    inbound_tx
        .unbounded_send(Ok(Inbound::Text("ping".to_string())))
        .unwrap();
    inbound_tx.unbounded_send(Ok(Inbound::Close)).unwrap();

    let exit = task.await.unwrap().unwrap();
    assert_eq!(exit, PumpExit::ClosedByPeer);
    disconnected(&hub, &id).await;
    assert_eq!(hub.metrics().snapshot().frames_received, 2);
}

#[tokio::test]
async fn read_error_unregisters_the_client() {
    let hub = hub();
    let id = Identity::new("user_1");

    let (inbound_tx, inbound_rx) = fmpsc::unbounded::<Result<Inbound, std::io::Error>>();
    let (outbound_tx, _outbound_rx) = fmpsc::unbounded::<String>();

    let task = {
        let hub = hub.clone();
        let id = id.clone();
        tokio::spawn(async move { hub.attach(id, inbound_rx, outbound_tx).await })
    };
    connected(&hub, &id).await;

    inbound_tx
        .unbounded_send(Err(std::io::Error::other("connection reset")))
        .unwrap();

    assert_eq!(task.await.unwrap().unwrap(), PumpExit::ReadFailed);
    disconnected(&hub, &id).await;
}

#[tokio::test]
async fn read_error_closes_the_transport_gracefully() {
    let hub = hub();
    let id = Identity::new("user_1");

    let (inbound_tx, inbound_rx) = fmpsc::unbounded::<Result<Inbound, std::io::Error>>();
    let sink = ClosingSink::default();
    let closed = sink.closed.clone();

    let task = {
        let hub = hub.clone();
        let id = id.clone();
        tokio::spawn(async move { hub.attach(id, inbound_rx, sink).await })
    };
    connected(&hub, &id).await;

    inbound_tx
        .unbounded_send(Err(std::io::Error::other("connection reset")))
        .unwrap();

    assert_eq!(task.await.unwrap().unwrap(), PumpExit::ReadFailed);
    assert!(closed.load(Ordering::SeqCst), "sink must be closed, not dropped");
}

#[tokio::test]
async fn second_attach_replaces_the_first() {
    let hub = hub();
    let id = Identity::new("user_1");

    let (_first_in_tx, first_in) = fmpsc::unbounded::<Result<Inbound, std::io::Error>>();
    let (first_out, _first_out_rx) = fmpsc::unbounded::<String>();
    let first = {
        let hub = hub.clone();
        let id = id.clone();
        tokio::spawn(async move { hub.attach(id, first_in, first_out).await })
    };
    connected(&hub, &id).await;

    let (_second_in_tx, second_in) = fmpsc::unbounded::<Result<Inbound, std::io::Error>>();
    let (second_out, mut second_out_rx) = fmpsc::unbounded::<String>();
    let _second = {
        let hub = hub.clone();
        let id = id.clone();
        tokio::spawn(async move { hub.attach(id, second_in, second_out).await })
    };

    // The first writer sees its channel closed once it is replaced.
    assert_eq!(first.await.unwrap().unwrap(), PumpExit::ChannelClosed);
    assert!(hub.is_connected(&id).await);

    assert!(hub.send_to(&id, "for second").await);
    assert_eq!(second_out_rx.next().await.as_deref(), Some("for second"));
}

#[tokio::test]
async fn dropping_every_handle_closes_all_clients() {
    let hub = hub();
    let id = Identity::new("user_1");

    let (client, mut rx) = ClientHandle::new(id.clone(), 4);
    hub.register(client).await.unwrap();
    connected(&hub, &id).await;

    drop(hub);
    let closed = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
    assert_eq!(closed.unwrap(), None);
}
