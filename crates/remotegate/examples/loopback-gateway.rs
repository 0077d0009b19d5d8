//! Loopback gateway example: one authority, two peers, validated channels.
//!
//! Run with:
//!   cargo run --example loopback-gateway --features logging [-- 'info,remotegate_transport=trace']

use std::collections::BTreeMap;
use std::sync::Arc;

use remotegate::logging::{init_logging, LogConfig, LogFormat};
use remotegate::validate::builtins::{IS_IN_RANGE, IS_NUMBER, IS_POSITIVE, IS_STRING};
use remotegate::{
    args, Args, AuthorityGateway, ChannelKind, CheckSpec, Endpoint, LoopbackHub, PeerGateway,
    PeerId, ValidationEngine,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = std::env::args().nth(1).unwrap_or_else(|| "info".to_string());
    init_logging(&LogConfig::new(LogFormat::Text, filter))?;

    let hub = LoopbackHub::new();
    let engine = Arc::new(ValidationEngine::new());
    let authority = AuthorityGateway::new(hub.authority(), Arc::clone(&engine));
    let alice = PeerGateway::new(hub.connect_peer_with_id(PeerId::new("alice")), Arc::clone(&engine));
    let bob = PeerGateway::new(hub.connect_peer_with_id(PeerId::new("bob")), Arc::clone(&engine));

    // Authority side: damage events and a priced purchase call.
    authority.on_inbound_event(
        "dmg",
        &[CheckSpec::new(IS_NUMBER), CheckSpec::new(IS_POSITIVE)],
        |from: &Endpoint, args: Args| {
            eprintln!("[authority] {from} dealt {}", args[1]);
        },
    );
    authority.set_authority_callback(
        "buy",
        &[
            CheckSpec::new(IS_STRING),
            CheckSpec::new(IS_IN_RANGE).params([1, 99]),
        ],
        |from: &Endpoint, args: Args| {
            eprintln!("[authority] {from} buys {} x{}", args[0], args[1]);
            args![true]
        },
    );
    authority.declare("announce", ChannelKind::Event);
    authority.declare("tick", ChannelKind::Event);
    authority.declare("ping", ChannelKind::Call);

    // Peer side.
    for (name, peer) in [("alice", &alice), ("bob", &bob)] {
        peer.on_inbound_event("announce", &[CheckSpec::new(IS_STRING)], move |_, args| {
            eprintln!("[{name}] announcement: {}", args[0]);
        });
        peer.on_inbound_event("tick", &[], move |_, args| {
            eprintln!("[{name}] tick {}", args[0]);
        });
        peer.set_peer_callback("ping", &[], move |_, _| args![name]);
    }

    alice.fire_to_authority("dmg", args![1, 25]);
    // Second argument fails isPositive; the handler never runs.
    bob.fire_to_authority("dmg", args![1, -5]);

    eprintln!("[alice] buy ok: {:?}", alice.invoke_authority("buy", args!["potion", 3]));
    eprintln!("[bob] buy out of range: {:?}", bob.invoke_authority("buy", args!["potion", 500]));

    authority.fire_to_all("announce", args!["round two"]);
    authority.fire_to_one(&PeerId::new("bob"), "announce", args!["psst, bob"]);

    let reply = authority.invoke_peer(
        &PeerId::new("alice"),
        "ping",
        &[CheckSpec::new(IS_STRING)],
        args![],
    );
    eprintln!("[authority] alice answered ping: {reply:?}");

    let mut batch = BTreeMap::new();
    batch.insert("tick", args![1]);
    batch.insert("ping", args![2]);
    batch.insert("announce", args!["batched"]);
    let report = authority.dispatch_batch(batch);
    eprintln!(
        "[authority] batch fired={} skipped={:?}",
        report.fired, report.skipped
    );

    // Peers never create channels.
    alice.fire_to_authority("not-declared", args![]);
    eprintln!("[hub] channels: {:?}", hub.channel_names());
    Ok(())
}
