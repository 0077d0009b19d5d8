//! In-process host with synchronous delivery.
//!
//! One [`LoopbackHub`] holds the shared namespace. Each role talks to it
//! through a [`LoopbackEndpoint`]; handlers run on the sender's thread
//! before `fire`/`invoke` returns.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use remotegate_value::Args;

use crate::channel::{Channel, ChannelHandle, ChannelKind, Endpoint, PeerId, Target};
use crate::error::{Result, TransportError};
use crate::traits::{CallHandler, Directory, EventHandler, Transport};

type HandlerKey = (Endpoint, ChannelHandle);

#[derive(Default)]
struct Shared {
    channels: Mutex<HashMap<String, Channel>>,
    peers: Mutex<Vec<PeerId>>,
    event_handlers: Mutex<HashMap<HandlerKey, Vec<EventHandler>>>,
    call_handlers: Mutex<HashMap<HandlerKey, CallHandler>>,
    next_handle: AtomicU64,
    next_peer_id: AtomicU64,
}

impl Shared {
    fn known(&self, channel: &Channel) -> bool {
        self.channels
            .lock()
            .get(&channel.name)
            .is_some_and(|found| found.handle == channel.handle)
    }

    fn is_connected(&self, peer: &PeerId) -> bool {
        self.peers.lock().contains(peer)
    }

    fn deliver(&self, from: &Endpoint, to: Endpoint, channel: &Channel, args: Args) {
        let handlers = self
            .event_handlers
            .lock()
            .get(&(to.clone(), channel.handle))
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            tracing::trace!(channel = %channel.name, to = %to, "event dropped: no listeners");
            return;
        }

        tracing::trace!(channel = %channel.name, from = %from, to = %to, "delivering event");
        for handler in handlers {
            handler(from, args.clone());
        }
    }
}

/// Shared namespace and connection table for one process.
#[derive(Clone, Default)]
pub struct LoopbackHub {
    shared: Arc<Shared>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoint with authority privileges.
    pub fn authority(&self) -> LoopbackEndpoint {
        LoopbackEndpoint {
            shared: Arc::clone(&self.shared),
            local: Endpoint::Authority,
        }
    }

    /// Connect a new peer with an auto-generated id.
    pub fn connect_peer(&self) -> LoopbackEndpoint {
        let id = self.shared.next_peer_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.connect_peer_with_id(PeerId::new(format!("peer-{id}")))
    }

    /// Connect a new peer with an explicit id.
    pub fn connect_peer_with_id(&self, id: PeerId) -> LoopbackEndpoint {
        {
            let mut peers = self.shared.peers.lock();
            if !peers.contains(&id) {
                peers.push(id.clone());
            }
        }
        tracing::debug!(peer = %id, "peer connected");
        LoopbackEndpoint {
            shared: Arc::clone(&self.shared),
            local: Endpoint::Peer(id),
        }
    }

    /// Disconnect a peer and drop its handlers.
    pub fn disconnect_peer(&self, id: &PeerId) {
        self.shared.peers.lock().retain(|peer| peer != id);
        let endpoint = Endpoint::Peer(id.clone());
        self.shared
            .event_handlers
            .lock()
            .retain(|(owner, _), _| owner != &endpoint);
        self.shared
            .call_handlers
            .lock()
            .retain(|(owner, _), _| owner != &endpoint);
        tracing::debug!(peer = %id, "peer disconnected");
    }

    /// Connected peers in connection order.
    pub fn peers(&self) -> Vec<PeerId> {
        self.shared.peers.lock().clone()
    }

    /// Returns true if `name` is registered in the namespace.
    pub fn contains(&self, name: &str) -> bool {
        self.shared.channels.lock().contains_key(name)
    }

    /// Registered channel names, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.shared.channels.lock().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

/// One role's view of a [`LoopbackHub`].
#[derive(Clone)]
pub struct LoopbackEndpoint {
    shared: Arc<Shared>,
    local: Endpoint,
}

impl LoopbackEndpoint {
    /// The endpoint this handle speaks for.
    pub fn endpoint(&self) -> &Endpoint {
        &self.local
    }

    fn ensure_known(&self, channel: &Channel) -> Result<()> {
        if self.shared.known(channel) {
            Ok(())
        } else {
            Err(TransportError::UnknownChannel(channel.name.clone()))
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        match &self.local {
            Endpoint::Peer(id) if !self.shared.is_connected(id) => {
                Err(TransportError::Disconnected(id.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn invalid_target(&self, channel: &Channel, target: &Target) -> TransportError {
        TransportError::InvalidTarget {
            channel: channel.name.clone(),
            target: format!("{target} from {}", self.local),
        }
    }

    /// Resolve a single-endpoint target reachable from this endpoint.
    fn resolve(&self, channel: &Channel, target: &Target) -> Result<Endpoint> {
        match (&self.local, target) {
            (Endpoint::Peer(_), Target::Authority) => Ok(Endpoint::Authority),
            (Endpoint::Authority, Target::Peer(id)) => {
                if self.shared.is_connected(id) {
                    Ok(Endpoint::Peer(id.clone()))
                } else {
                    Err(TransportError::UnknownPeer(id.clone()))
                }
            }
            _ => Err(self.invalid_target(channel, target)),
        }
    }
}

impl Directory for LoopbackEndpoint {
    fn find(&self, name: &str) -> Option<Channel> {
        self.shared.channels.lock().get(name).cloned()
    }

    fn create(&self, name: &str, kind: ChannelKind) -> Result<Channel> {
        if !self.local.role().is_authority() {
            return Err(TransportError::Rejected(format!(
                "{} may not create channel {name}",
                self.local
            )));
        }

        let mut channels = self.shared.channels.lock();
        if let Some(existing) = channels.get(name) {
            if existing.kind != kind {
                return Err(TransportError::KindConflict {
                    name: name.to_string(),
                    existing: existing.kind,
                });
            }
            return Ok(existing.clone());
        }

        let handle = ChannelHandle(self.shared.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        let channel = Channel {
            name: name.to_string(),
            kind,
            handle,
        };
        channels.insert(name.to_string(), channel.clone());
        tracing::debug!(channel = name, kind = %kind, "channel registered");
        Ok(channel)
    }
}

impl Transport for LoopbackEndpoint {
    fn fire(&self, channel: &Channel, target: &Target, args: Args) -> Result<()> {
        self.ensure_connected()?;
        self.ensure_known(channel)?;

        match (&self.local, target) {
            (Endpoint::Authority, Target::AllPeers) => {
                let peers = self.shared.peers.lock().clone();
                for peer in peers {
                    self.shared
                        .deliver(&self.local, Endpoint::Peer(peer), channel, args.clone());
                }
                Ok(())
            }
            _ => {
                let to = self.resolve(channel, target)?;
                self.shared.deliver(&self.local, to, channel, args);
                Ok(())
            }
        }
    }

    fn invoke(&self, channel: &Channel, target: &Target, args: Args) -> Result<Args> {
        self.ensure_connected()?;
        self.ensure_known(channel)?;

        let to = self.resolve(channel, target)?;
        let handler = self
            .shared
            .call_handlers
            .lock()
            .get(&(to.clone(), channel.handle))
            .cloned()
            .ok_or_else(|| TransportError::NoResponder {
                channel: channel.name.clone(),
                target: to.to_string(),
            })?;

        tracing::trace!(channel = %channel.name, from = %self.local, to = %to, "invoking");
        Ok(handler(&self.local, args))
    }

    fn listen(&self, channel: &Channel, handler: EventHandler) -> Result<()> {
        self.ensure_connected()?;
        self.ensure_known(channel)?;
        self.shared
            .event_handlers
            .lock()
            .entry((self.local.clone(), channel.handle))
            .or_default()
            .push(handler);
        Ok(())
    }

    fn answer(&self, channel: &Channel, handler: CallHandler) -> Result<()> {
        self.ensure_connected()?;
        self.ensure_known(channel)?;
        self.shared
            .call_handlers
            .lock()
            .insert((self.local.clone(), channel.handle), handler);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use remotegate_value::{args, Value};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<(Endpoint, Args)>>>, EventHandler) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: EventHandler = Arc::new(move |from: &Endpoint, args: Args| {
            sink.lock().push((from.clone(), args));
        });
        (seen, handler)
    }

    #[test]
    fn peer_ids_are_sequential() {
        let hub = LoopbackHub::new();
        let first = hub.connect_peer();
        let second = hub.connect_peer();
        assert_eq!(first.endpoint(), &Endpoint::Peer(PeerId::new("peer-1")));
        assert_eq!(second.endpoint(), &Endpoint::Peer(PeerId::new("peer-2")));
        assert_eq!(hub.peers().len(), 2);
    }

    #[test]
    fn only_authority_creates_channels() {
        let hub = LoopbackHub::new();
        let peer = hub.connect_peer();
        assert!(matches!(
            peer.create("chat", ChannelKind::Event),
            Err(TransportError::Rejected(_))
        ));
        assert!(!hub.contains("chat"));

        let authority = hub.authority();
        let created = authority.create("chat", ChannelKind::Event).unwrap();
        assert_eq!(peer.find("chat"), Some(created.clone()));
        assert_eq!(authority.create("chat", ChannelKind::Event).unwrap(), created);
        assert!(matches!(
            authority.create("chat", ChannelKind::Call),
            Err(TransportError::KindConflict { .. })
        ));
    }

    #[test]
    fn fire_to_all_reaches_every_peer_in_order() {
        let hub = LoopbackHub::new();
        let authority = hub.authority();
        let channel = authority.create("tick", ChannelKind::Event).unwrap();

        let first = hub.connect_peer();
        let second = hub.connect_peer();
        let (first_seen, first_handler) = recorder();
        let (second_seen, second_handler) = recorder();
        first.listen(&channel, first_handler).unwrap();
        second.listen(&channel, second_handler).unwrap();

        authority.fire(&channel, &Target::AllPeers, args![1]).unwrap();
        authority.fire(&channel, &Target::AllPeers, args![2]).unwrap();

        let first_seen = first_seen.lock();
        assert_eq!(first_seen.len(), 2);
        assert_eq!(first_seen[0].0, Endpoint::Authority);
        assert_eq!(first_seen[0].1, args![1]);
        assert_eq!(first_seen[1].1, args![2]);
        assert_eq!(second_seen.lock().len(), 2);
    }

    #[test]
    fn peer_fires_to_authority_with_sender_identity() {
        let hub = LoopbackHub::new();
        let authority = hub.authority();
        let channel = authority.create("chat", ChannelKind::Event).unwrap();
        let (seen, handler) = recorder();
        authority.listen(&channel, handler).unwrap();

        let peer = hub.connect_peer();
        peer.fire(&channel, &Target::Authority, args!["hi"]).unwrap();

        let seen = seen.lock();
        assert_eq!(seen[0].0, Endpoint::Peer(PeerId::new("peer-1")));
        assert_eq!(seen[0].1, vec![Value::from("hi")]);
    }

    #[test]
    fn invalid_targets_are_rejected() {
        let hub = LoopbackHub::new();
        let authority = hub.authority();
        let channel = authority.create("chat", ChannelKind::Event).unwrap();
        let peer = hub.connect_peer();

        assert!(matches!(
            peer.fire(&channel, &Target::AllPeers, args![]),
            Err(TransportError::InvalidTarget { .. })
        ));
        assert!(matches!(
            authority.fire(&channel, &Target::Authority, args![]),
            Err(TransportError::InvalidTarget { .. })
        ));
        assert!(matches!(
            authority.fire(&channel, &Target::Peer(PeerId::new("ghost")), args![]),
            Err(TransportError::UnknownPeer(_))
        ));
    }

    #[test]
    fn invoke_round_trips_through_answer_handler() {
        let hub = LoopbackHub::new();
        let authority = hub.authority();
        let channel = authority.create("add", ChannelKind::Call).unwrap();
        authority
            .answer(
                &channel,
                Arc::new(|_: &Endpoint, args: Args| {
                    let sum: f64 = args.iter().filter_map(Value::as_f64).sum();
                    args![sum]
                }),
            )
            .unwrap();

        let peer = hub.connect_peer();
        let reply = peer.invoke(&channel, &Target::Authority, args![2, 3]).unwrap();
        assert_eq!(reply, args![5.0]);
    }

    #[test]
    fn invoke_without_responder_fails() {
        let hub = LoopbackHub::new();
        let authority = hub.authority();
        let channel = authority.create("add", ChannelKind::Call).unwrap();
        let peer = hub.connect_peer();
        assert!(matches!(
            peer.invoke(&channel, &Target::Authority, args![]),
            Err(TransportError::NoResponder { .. })
        ));
    }

    #[test]
    fn disconnected_peer_cannot_send() {
        let hub = LoopbackHub::new();
        let authority = hub.authority();
        let channel = authority.create("chat", ChannelKind::Event).unwrap();
        let peer = hub.connect_peer();
        let id = PeerId::new("peer-1");
        hub.disconnect_peer(&id);

        assert!(hub.peers().is_empty());
        assert!(matches!(
            peer.fire(&channel, &Target::Authority, args![]),
            Err(TransportError::Disconnected(_))
        ));
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let hub = LoopbackHub::new();
        let authority = hub.authority();
        let forged = Channel {
            name: "forged".to_string(),
            kind: ChannelKind::Event,
            handle: ChannelHandle(99),
        };
        assert!(matches!(
            authority.fire(&forged, &Target::AllPeers, args![]),
            Err(TransportError::UnknownChannel(_))
        ));
    }
}
