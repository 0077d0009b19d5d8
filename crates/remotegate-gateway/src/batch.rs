use remotegate_value::Args;

use crate::gateway::AuthorityGateway;

/// Outcome of one batch dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Entries handed to the transport.
    pub fired: usize,
    /// Entries dropped because the name is registered as a call channel or
    /// the send failed.
    pub skipped: Vec<String>,
}

/// Fires a set of `name -> args` entries as independent broadcasts.
///
/// Not transactional: a failing entry is logged and skipped, and the
/// remaining entries still fire.
pub struct BatchDispatcher<'a> {
    gateway: &'a AuthorityGateway,
}

impl<'a> BatchDispatcher<'a> {
    pub fn new(gateway: &'a AuthorityGateway) -> Self {
        Self { gateway }
    }

    pub fn dispatch<I, N>(&self, batch: I) -> BatchReport
    where
        I: IntoIterator<Item = (N, Args)>,
        N: AsRef<str>,
    {
        let mut report = BatchReport::default();
        for (name, args) in batch {
            let name = name.as_ref();
            if self.gateway.broadcast(name, args) {
                report.fired += 1;
            } else {
                report.skipped.push(name.to_string());
            }
        }
        tracing::debug!(
            fired = report.fired,
            skipped = report.skipped.len(),
            "batch dispatched"
        );
        report
    }
}
