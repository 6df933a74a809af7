//! End-to-end delivery against a local TCP collector.

mod test_utils;

use std::net::TcpListener;

use femtogelf::{GelfLevel, GelfMessage, GelfSenderBuilder, GelfTcpSender, SenderError};
use rstest::rstest;

use test_utils::spawn_collector;

#[rstest]
fn sends_gelf_messages_over_tcp() {
    let collector = spawn_collector();
    let sender: GelfTcpSender =
        GelfTcpSender::new(&collector.addr.ip().to_string(), collector.addr.port())
            .expect("connect to collector");

    let message = GelfMessage::new("web-1", GelfLevel::Warning, "cache miss storm")
        .with_facility("cache")
        .with_field("region", "eu-west-1");
    assert!(sender.send_message(message));

    let json = collector.recv_json("payload received");
    assert_eq!(json["version"], "1.1");
    assert_eq!(json["host"], "web-1");
    assert_eq!(json["short_message"], "cache miss storm");
    assert_eq!(json["level"], 4);
    assert_eq!(json["facility"], "cache");
    assert_eq!(json["_region"], "eu-west-1");

    sender.close();
}

#[rstest]
fn delivers_each_record_as_its_own_frame() {
    let collector = spawn_collector();
    let sender: GelfTcpSender = GelfSenderBuilder::new()
        .with_tcp(collector.addr.ip().to_string(), collector.addr.port())
        .with_connect_timeout_ms(1_000)
        .with_write_timeout_ms(1_000)
        .build()
        .expect("build sender");

    for i in 0..3 {
        let message = GelfMessage::new("web-1", GelfLevel::Informational, &format!("m{i}"));
        assert!(sender.send_message(message));
    }
    let mut received: Vec<String> = (0..3)
        .map(|_| {
            collector.recv_json("frame received")["short_message"]
                .as_str()
                .expect("short_message is a string")
                .to_owned()
        })
        .collect();
    received.sort();
    assert_eq!(received, vec!["m0", "m1", "m2"]);
    sender.close();
    assert_eq!(sender.stats().delivered, 3);
}

#[rstest]
fn construction_fails_without_listener() {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("listener has address");
    drop(listener);

    let result = GelfTcpSender::<GelfMessage>::new(&addr.ip().to_string(), addr.port());
    assert!(matches!(result, Err(SenderError::Connect { addr: a, .. }) if a == addr));
}

#[rstest]
fn invalid_messages_are_accepted_then_dropped() {
    let collector = spawn_collector();
    let sender: GelfTcpSender =
        GelfTcpSender::new(&collector.addr.ip().to_string(), collector.addr.port())
            .expect("connect to collector");

    assert!(sender.send_message(GelfMessage::new("web-1", GelfLevel::Error, "")));
    assert!(sender.send_message(GelfMessage::new("web-1", GelfLevel::Debug, "valid")));

    let json = collector.recv_json("valid payload received");
    assert_eq!(json["short_message"], "valid");
    sender.close();
    assert_eq!(sender.stats().dropped, 1);
}
