use std::sync::Arc;

use remotegate_transport::{
    CallHandler, Channel, ChannelKind, Directory, Endpoint, EventHandler, PeerId, Role, Target,
    Transport, TransportError,
};
use remotegate_validate::{ArgumentRejected, CheckSpec, ValidationEngine};
use remotegate_value::Args;

use crate::batch::{BatchDispatcher, BatchReport};
use crate::error::GatewayError;
use crate::registry::ChannelRegistry;

/// State shared by both gateway roles.
struct GatewayCore {
    registry: ChannelRegistry,
    engine: Arc<ValidationEngine>,
    transport: Arc<dyn Transport>,
}

impl GatewayCore {
    fn new(
        role: Role,
        directory: Arc<dyn Directory>,
        transport: Arc<dyn Transport>,
        engine: Arc<ValidationEngine>,
    ) -> Self {
        Self {
            registry: ChannelRegistry::new(role, directory),
            engine,
            transport,
        }
    }

    /// Resolve a channel, logging when it cannot be used.
    ///
    /// # Panics
    ///
    /// Panics when the directory refuses to create a channel for the authority.
    fn resolve(&self, name: &str, kind: ChannelKind) -> Option<Arc<Channel>> {
        let err = match self.registry.get_or_create(name, kind) {
            Ok(Some(channel)) => return Some(channel),
            Ok(None) => GatewayError::ChannelNotFound(name.to_string()),
            Err(err) => err,
        };

        if let GatewayError::Critical(message) = &err {
            tracing::error!(channel = name, %message, "critical failure");
            panic!("remotegate: {message}");
        }
        tracing::warn!(channel = name, kind = %kind, error = %err, "channel not found");
        None
    }

    fn fire(&self, name: &str, target: Target, args: Args) -> bool {
        let Some(channel) = self.resolve(name, ChannelKind::Event) else {
            return false;
        };
        match self.transport.fire(&channel, &target, args) {
            Ok(()) => true,
            Err(err) => {
                log_transport_failure("fire", name, Some(&target), err);
                false
            }
        }
    }

    fn invoke(&self, name: &str, target: Target, args: Args) -> Option<Args> {
        let channel = self.resolve(name, ChannelKind::Call)?;
        match self.transport.invoke(&channel, &target, args) {
            Ok(reply) => Some(reply),
            Err(err) => {
                log_transport_failure("invoke", name, Some(&target), err);
                None
            }
        }
    }

    fn listen<F>(&self, name: &str, checks: &[CheckSpec], handler: F)
    where
        F: Fn(&Endpoint, Args) + Send + Sync + 'static,
    {
        let Some(channel) = self.resolve(name, ChannelKind::Event) else {
            return;
        };

        let engine = Arc::clone(&self.engine);
        let checks = checks.to_vec();
        let channel_name = channel.name.clone();
        let gated: EventHandler = Arc::new(move |from: &Endpoint, args: Args| {
            if let Err(rejected) = engine.check_arguments(&checks, &args) {
                log_rejection(&channel_name, from, rejected);
                return;
            }
            handler(from, args);
        });

        if let Err(err) = self.transport.listen(&channel, gated) {
            log_transport_failure("listen", name, None, err);
        }
    }

    fn answer<F>(&self, name: &str, checks: &[CheckSpec], handler: F)
    where
        F: Fn(&Endpoint, Args) -> Args + Send + Sync + 'static,
    {
        let Some(channel) = self.resolve(name, ChannelKind::Call) else {
            return;
        };

        let engine = Arc::clone(&self.engine);
        let checks = checks.to_vec();
        let channel_name = channel.name.clone();
        let gated: CallHandler = Arc::new(move |from: &Endpoint, args: Args| {
            if let Err(rejected) = engine.check_arguments(&checks, &args) {
                log_rejection(&channel_name, from, rejected);
                // The caller is blocked on a reply; answer with no values.
                return Args::new();
            }
            handler(from, args)
        });

        if let Err(err) = self.transport.answer(&channel, gated) {
            log_transport_failure("answer", name, None, err);
        }
    }
}

fn log_transport_failure(
    operation: &'static str,
    channel: &str,
    target: Option<&Target>,
    err: TransportError,
) {
    let err = GatewayError::from(err);
    match target {
        Some(target) => {
            tracing::warn!(channel, operation, %target, error = %err, "{operation} failed")
        }
        None => tracing::warn!(channel, operation, error = %err, "{operation} failed"),
    }
}

fn log_rejection(channel: &str, from: &Endpoint, rejected: ArgumentRejected) {
    let ArgumentRejected {
        index,
        validator,
        verdict,
    } = rejected;
    let err = GatewayError::ValidationFailed {
        channel: channel.to_string(),
        index,
        validator,
        verdict,
    };
    tracing::warn!(channel, index, %from, error = %err, "sanity check failed");
}

/// Authority side of the gateway.
///
/// Creates channels on first use, fires events at peers, calls into peers,
/// and answers peer calls.
pub struct AuthorityGateway {
    core: GatewayCore,
}

impl AuthorityGateway {
    /// Build over a host that provides both the directory and the transport.
    pub fn new<H>(host: H, engine: Arc<ValidationEngine>) -> Self
    where
        H: Directory + Transport + 'static,
    {
        let host = Arc::new(host);
        let directory: Arc<dyn Directory> = host.clone();
        Self::with_parts(directory, host, engine)
    }

    /// Build over separate directory and transport implementations.
    pub fn with_parts(
        directory: Arc<dyn Directory>,
        transport: Arc<dyn Transport>,
        engine: Arc<ValidationEngine>,
    ) -> Self {
        Self {
            core: GatewayCore::new(Role::Authority, directory, transport, engine),
        }
    }

    /// Register `name` ahead of use so peers can discover it.
    ///
    /// Returns false when the name is already registered with another kind.
    pub fn declare(&self, name: &str, kind: ChannelKind) -> bool {
        self.core.resolve(name, kind).is_some()
    }

    /// Fire an event at one peer.
    pub fn fire_to_one(&self, recipient: &PeerId, name: &str, args: Args) {
        self.core.fire(name, Target::Peer(recipient.clone()), args);
    }

    /// Fire an event at every connected peer.
    pub fn fire_to_all(&self, name: &str, args: Args) {
        self.core.fire(name, Target::AllPeers, args);
    }

    /// Run `handler` for every inbound event on `name` whose arguments pass `checks`.
    ///
    /// Messages failing a check are logged with the 1-based argument index and
    /// dropped before `handler` runs.
    pub fn on_inbound_event<F>(&self, name: &str, checks: &[CheckSpec], handler: F)
    where
        F: Fn(&Endpoint, Args) + Send + Sync + 'static,
    {
        self.core.listen(name, checks, handler);
    }

    /// Call into `recipient` and wait for its reply.
    ///
    /// When `result_checks` is non-empty, the reply is validated positionally;
    /// any failure discards the whole reply. Returns `None` when the channel
    /// is missing, the transport fails, or a result check fails.
    pub fn invoke_peer(
        &self,
        recipient: &PeerId,
        name: &str,
        result_checks: &[CheckSpec],
        args: Args,
    ) -> Option<Args> {
        let reply = self
            .core
            .invoke(name, Target::Peer(recipient.clone()), args)?;
        if let Err(rejected) = self.core.engine.check_arguments(result_checks, &reply) {
            log_rejection(name, &Endpoint::Peer(recipient.clone()), rejected);
            return None;
        }
        Some(reply)
    }

    /// Answer peer calls on `name`.
    ///
    /// Calls failing `checks` are logged and answered with an empty reply.
    pub fn set_authority_callback<F>(&self, name: &str, checks: &[CheckSpec], handler: F)
    where
        F: Fn(&Endpoint, Args) -> Args + Send + Sync + 'static,
    {
        self.core.answer(name, checks, handler);
    }

    /// Fire every entry of `batch` at all peers.
    ///
    /// The authority creates absent names on first use, so an entry is only
    /// skipped when its name is registered as a call channel or the send fails.
    pub fn dispatch_batch<I, N>(&self, batch: I) -> BatchReport
    where
        I: IntoIterator<Item = (N, Args)>,
        N: AsRef<str>,
    {
        BatchDispatcher::new(self).dispatch(batch)
    }

    pub(crate) fn broadcast(&self, name: &str, args: Args) -> bool {
        self.core.fire(name, Target::AllPeers, args)
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.core.registry
    }

    pub fn engine(&self) -> &Arc<ValidationEngine> {
        &self.core.engine
    }
}

/// Peer side of the gateway.
///
/// Attaches to channels the authority created; never creates channels.
pub struct PeerGateway {
    core: GatewayCore,
}

impl PeerGateway {
    /// Build over a host that provides both the directory and the transport.
    pub fn new<H>(host: H, engine: Arc<ValidationEngine>) -> Self
    where
        H: Directory + Transport + 'static,
    {
        let host = Arc::new(host);
        let directory: Arc<dyn Directory> = host.clone();
        Self::with_parts(directory, host, engine)
    }

    /// Build over separate directory and transport implementations.
    pub fn with_parts(
        directory: Arc<dyn Directory>,
        transport: Arc<dyn Transport>,
        engine: Arc<ValidationEngine>,
    ) -> Self {
        Self {
            core: GatewayCore::new(Role::Peer, directory, transport, engine),
        }
    }

    /// Fire an event at the authority.
    pub fn fire_to_authority(&self, name: &str, args: Args) {
        self.core.fire(name, Target::Authority, args);
    }

    /// Run `handler` for every inbound event on `name` whose arguments pass `checks`.
    pub fn on_inbound_event<F>(&self, name: &str, checks: &[CheckSpec], handler: F)
    where
        F: Fn(&Endpoint, Args) + Send + Sync + 'static,
    {
        self.core.listen(name, checks, handler);
    }

    /// Call into the authority and return its reply unvalidated.
    pub fn invoke_authority(&self, name: &str, args: Args) -> Option<Args> {
        self.core.invoke(name, Target::Authority, args)
    }

    /// Answer authority calls on `name`.
    ///
    /// Calls failing `checks` are logged and answered with an empty reply.
    pub fn set_peer_callback<F>(&self, name: &str, checks: &[CheckSpec], handler: F)
    where
        F: Fn(&Endpoint, Args) -> Args + Send + Sync + 'static,
    {
        self.core.answer(name, checks, handler);
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.core.registry
    }

    pub fn engine(&self) -> &Arc<ValidationEngine> {
        &self.core.engine
    }
}
