//! End-to-end over localhost UDP: quorum rounds and a fragmented broadcast.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use paxos_protocol::{
    drive, now_ms, Callbacks, Codec, CommLayerGroup, FragmentJoiner, FragmentingComm,
    FragmentingGroup, GroupMembership, Member, MessageWithSender, MsgPackCodec, ProtocolConfig,
    QuorumRequest, Receiver,
};
use paxos_transport::{CommLayer, UdpCommLayer, UdpConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Prepare {
    ballot: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Promise {
    ballot: u64,
    from: Member,
}

impl MessageWithSender for Promise {
    fn sender(&self) -> Member {
        self.from
    }
}

/// Everything that crosses the wire in the fragmented quorum round.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Wire {
    Prepare { ballot: u64, value: Bytes },
    Promise(Promise),
}

/// Collects reassembled messages with their sender.
#[derive(Default)]
struct Inbox(Vec<(Member, Bytes)>);

impl Receiver<Bytes> for Inbox {
    fn receive(&mut self, from: Member, message: Bytes) {
        self.0.push((from, message));
    }
}

async fn bind_group(n: usize) -> Vec<UdpCommLayer> {
    let mut comms = Vec::new();
    for _ in 0..n {
        comms.push(UdpCommLayer::bind(UdpConfig::new()).await.unwrap());
    }
    comms
}

/// Acceptors answer every prepare with a promise; the proposer's driver
/// completes once all three (itself included) have promised.
#[tokio::test]
async fn quorum_round_over_udp() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .try_init();

    let comms = bind_group(3).await;
    let all: Vec<Member> = comms.iter().map(UdpCommLayer::local_member).collect();
    let membership = Arc::new(GroupMembership::new(all.clone(), 0).unwrap());

    for comm in comms.iter().cloned() {
        if comm.local_member() == all[0] {
            continue;
        }
        tokio::spawn(async move {
            while let Ok((from, data)) = comm.recv().await {
                let Ok(prepare) = MsgPackCodec.deserialize::<Prepare>(&data) else {
                    continue;
                };
                let promise = Promise {
                    ballot: prepare.ballot,
                    from: comm.local_member(),
                };
                let bytes = MsgPackCodec.serialize(&promise).unwrap();
                let _ = comm.send_to(&from, &bytes);
            }
        });
    }

    let proposer = comms[0].clone();
    let (tx, rx) = tokio::sync::mpsc::channel::<Promise>(16);
    let listener = proposer.clone();
    tokio::spawn(async move {
        while let Ok((from, data)) = listener.recv().await {
            if let Ok(prepare) = MsgPackCodec.deserialize::<Prepare>(&data) {
                // The proposer is a member too and promises to itself.
                let promise = Promise { ballot: prepare.ballot, from };
                if tx.send(promise).await.is_err() {
                    break;
                }
            } else if let Ok(promise) = MsgPackCodec.deserialize::<Promise>(&data) {
                if tx.send(promise).await.is_err() {
                    break;
                }
            }
        }
    });

    let request = QuorumRequest::new(
        membership,
        proposer,
        Prepare { ballot: 7 },
        now_ms(),
        Callbacks::<Promise>::new(),
    )
    .unwrap();

    let request = tokio::time::timeout(
        Duration::from_secs(10),
        drive(request, rx, Duration::from_millis(50)),
    )
    .await
    .expect("request did not complete");

    assert!(request.is_completed());
    assert!(request.is_quorum_reached());
    assert_eq!(request.responded_members(), all);
}

/// A 10 KB message crosses a 4 000-byte fragment threshold and is
/// reassembled on every member.
#[tokio::test]
async fn fragmented_broadcast_over_udp() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .try_init();

    let comms = bind_group(3).await;
    let all: Vec<Member> = comms.iter().map(UdpCommLayer::local_member).collect();
    let membership = Arc::new(GroupMembership::new(all.clone(), 0).unwrap());

    let config = ProtocolConfig::new().fragment_size(4_000);
    let group = FragmentingGroup::with_config(
        CommLayerGroup::new(comms[0].clone(), membership),
        &config,
    );
    let message = Bytes::from((0..10_000).map(|i| (i % 251) as u8).collect::<Vec<u8>>());

    let frames = group.broadcast(&message).unwrap();
    assert_eq!(frames, 3);

    for comm in &comms {
        let mut joiner = FragmentJoiner::<Bytes, _>::new(Inbox::default());
        while joiner.receiver().0.is_empty() {
            let (from, data) = tokio::time::timeout(Duration::from_secs(5), comm.recv())
                .await
                .expect("fragment not received")
                .unwrap();
            joiner.receive_bytes(from, &data).unwrap();
        }
        assert_eq!(joiner.into_receiver().0, vec![(all[0], message.clone())]);
    }
}

/// A 100 KB prepare cannot fit in one datagram; sent through
/// `FragmentingComm` it is reassembled by every member and the round
/// still reaches quorum and completion.
#[tokio::test]
async fn large_request_reaches_quorum_through_fragmenting_comm() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .try_init();

    let comms = bind_group(3).await;
    let all: Vec<Member> = comms.iter().map(UdpCommLayer::local_member).collect();
    let membership = Arc::new(GroupMembership::new(all.clone(), 0).unwrap());
    let config = ProtocolConfig::new().for_datagram_size(comms[0].max_datagram_size());
    let framed: Vec<FragmentingComm<UdpCommLayer>> = comms
        .iter()
        .map(|comm| FragmentingComm::with_config(comm.clone(), &config))
        .collect();

    for (comm, reply_via) in comms.iter().zip(&framed).skip(1) {
        let comm = comm.clone();
        let reply_via = reply_via.clone();
        let local = comm.local_member();
        tokio::spawn(async move {
            let mut joiner = FragmentJoiner::<Wire, _>::new(move |from: Member, wire: Wire| {
                if let Wire::Prepare { ballot, .. } = wire {
                    let reply = Wire::Promise(Promise { ballot, from: local });
                    let bytes = MsgPackCodec.serialize(&reply).unwrap();
                    let _ = reply_via.send_to(&from, &bytes);
                }
            });
            while let Ok((from, data)) = comm.recv().await {
                let _ = joiner.receive_bytes(from, &data);
            }
        });
    }

    let (tx, rx) = tokio::sync::mpsc::channel::<Promise>(64);
    let listener = comms[0].clone();
    tokio::spawn(async move {
        let mut joiner = FragmentJoiner::<Wire, _>::new(move |from: Member, wire: Wire| {
            let promise = match wire {
                // The proposer is a member too and promises to itself.
                Wire::Prepare { ballot, .. } => Promise { ballot, from },
                Wire::Promise(promise) => promise,
            };
            let _ = tx.try_send(promise);
        });
        while let Ok((from, data)) = listener.recv().await {
            let _ = joiner.receive_bytes(from, &data);
        }
    });

    let prepare = Wire::Prepare {
        ballot: 9,
        value: Bytes::from(vec![7u8; 100_000]),
    };
    let request = QuorumRequest::new(
        membership,
        framed[0].clone(),
        prepare,
        now_ms(),
        Callbacks::<Promise>::new(),
    )
    .unwrap();
    assert!(request.serialized_payload().len() > comms[0].max_datagram_size());

    let request = tokio::time::timeout(
        Duration::from_secs(10),
        drive(request, rx, Duration::from_millis(50)),
    )
    .await
    .expect("request did not complete");

    assert!(request.is_quorum_reached());
    assert!(request.is_completed());
    assert_eq!(request.responded_members(), all);
}
