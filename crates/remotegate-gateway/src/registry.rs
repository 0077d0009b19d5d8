use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use remotegate_transport::{Channel, ChannelKind, Directory, Role, TransportError};

use crate::error::{GatewayError, Result};

/// Name-keyed cache of channels resolved through the shared directory.
///
/// Lookups are identity-stable: once a name resolves, every later call
/// returns the same `Arc<Channel>`. Only the authority role creates
/// channels; peers can only discover channels the authority registered.
pub struct ChannelRegistry {
    role: Role,
    directory: Arc<dyn Directory>,
    channels: Mutex<HashMap<String, Arc<Channel>>>,
}

impl ChannelRegistry {
    pub fn new(role: Role, directory: Arc<dyn Directory>) -> Self {
        Self {
            role,
            directory,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `name`, creating it as `kind` when this registry has authority.
    ///
    /// Returns `Ok(None)` when a peer asks for a name the authority has not
    /// registered. Resolution holds the registry lock from cache check to
    /// insert, so racing first uses agree on one channel.
    pub fn get_or_create(&self, name: &str, kind: ChannelKind) -> Result<Option<Arc<Channel>>> {
        let mut channels = self.channels.lock();
        if let Some(channel) = channels.get(name) {
            ensure_kind(channel, kind)?;
            return Ok(Some(Arc::clone(channel)));
        }

        let resolved = match self.directory.find(name) {
            Some(found) => {
                tracing::debug!(channel = name, kind = %found.kind, role = %self.role, "channel attached");
                found
            }
            None if self.role.is_authority() => {
                let created = self
                    .directory
                    .create(name, kind)
                    .map_err(|err| creation_error(name, kind, err))?;
                tracing::debug!(channel = name, kind = %kind, "channel created");
                created
            }
            None => return Ok(None),
        };

        let channel = Arc::new(resolved);
        channels.insert(name.to_string(), Arc::clone(&channel));
        ensure_kind(&channel, kind)?;
        Ok(Some(channel))
    }

    /// Cached channel for `name`, without consulting the directory.
    pub fn cached(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.lock().get(name).cloned()
    }

    /// Number of cached channels.
    pub fn len(&self) -> usize {
        self.channels.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("role", &self.role)
            .field("channels", &self.len())
            .finish()
    }
}

fn ensure_kind(channel: &Channel, requested: ChannelKind) -> Result<()> {
    if channel.kind == requested {
        Ok(())
    } else {
        Err(GatewayError::KindMismatch {
            name: channel.name.clone(),
            requested,
            existing: channel.kind,
        })
    }
}

fn creation_error(name: &str, requested: ChannelKind, err: TransportError) -> GatewayError {
    match err {
        TransportError::KindConflict { existing, .. } => GatewayError::KindMismatch {
            name: name.to_string(),
            requested,
            existing,
        },
        other => GatewayError::Critical(format!("authority could not create channel {name}: {other}")),
    }
}
