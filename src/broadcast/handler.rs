//! Top-level `transact` entry point.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::Instrument;
use uuid::Uuid;

use crate::broadcast::assembler::TransactionAssembler;
use crate::broadcast::error::TransactError;
use crate::broadcast::race::{race_broadcast, DEFAULT_BROADCAST_TIMEOUT};
use crate::broadcast::resolver::resolve_reference;
use crate::chain::serializer::{AbiSerializer, TransactionSerializer};
use crate::chain::signer::TransactionSigner;
use crate::chain::types::{Action, Confirmation};
use crate::config::schema::BroadcasterConfig;
use crate::rpc::client::{ChainRpc, HttpEndpoint};

/// Default lifetime of a transaction after it is built.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(120);

/// Timing knobs for one broadcaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOptions {
    /// Deadline for the broadcast race.
    pub timeout: Duration,
    /// How far in the future the transaction expires.
    pub expiration: Duration,
}

impl Default for BroadcastOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_BROADCAST_TIMEOUT,
            expiration: DEFAULT_EXPIRATION,
        }
    }
}

/// Sends transactions through a fixed, ordered set of endpoints.
#[derive(Clone)]
pub struct Broadcaster {
    endpoints: Vec<Arc<dyn ChainRpc>>,
    assembler: TransactionAssembler,
    options: BroadcastOptions,
}

impl Broadcaster {
    /// Broadcaster using the Antelope binary serializer.
    pub fn new(
        endpoints: Vec<Arc<dyn ChainRpc>>,
        signer: Arc<dyn TransactionSigner>,
        options: BroadcastOptions,
    ) -> Self {
        Self::with_serializer(endpoints, Arc::new(AbiSerializer), signer, options)
    }

    pub fn with_serializer(
        endpoints: Vec<Arc<dyn ChainRpc>>,
        serializer: Arc<dyn TransactionSerializer>,
        signer: Arc<dyn TransactionSigner>,
        options: BroadcastOptions,
    ) -> Self {
        Self {
            endpoints,
            assembler: TransactionAssembler::new(serializer, signer),
            options,
        }
    }

    /// Build HTTP endpoints from configuration.
    ///
    /// With a `session`, every endpoint shares it; otherwise each call opens
    /// its own connection.
    pub fn from_config(
        config: &BroadcasterConfig,
        signer: Arc<dyn TransactionSigner>,
        session: Option<reqwest::Client>,
    ) -> Self {
        let request_timeout = Duration::from_secs(config.rpc.request_timeout_secs);
        let endpoints = config
            .resolved_endpoints()
            .into_iter()
            .map(|url| {
                let endpoint = match &session {
                    Some(session) => HttpEndpoint::with_session(url, session.clone()),
                    None => HttpEndpoint::new(url),
                };
                Arc::new(endpoint.with_request_timeout(request_timeout)) as Arc<dyn ChainRpc>
            })
            .collect();

        Self::new(endpoints, signer, config.broadcast.options())
    }

    pub fn endpoints(&self) -> &[Arc<dyn ChainRpc>] {
        &self.endpoints
    }

    pub fn options(&self) -> BroadcastOptions {
        self.options
    }

    /// Resolve reference data, sign, and race the transaction to every endpoint.
    pub async fn transact(&self, actions: Vec<Action>) -> Result<Confirmation, TransactError> {
        let span = tracing::info_span!(
            "transact",
            transact_id = %Uuid::new_v4(),
            actions = actions.len(),
        );
        self.transact_inner(actions).instrument(span).await
    }

    async fn transact_inner(&self, mut actions: Vec<Action>) -> Result<Confirmation, TransactError> {
        let reference = resolve_reference(&self.endpoints, &mut actions).await?;

        let expiration = expiration_from_now(self.options.expiration);
        let signed = self.assembler.assemble(&reference, actions, expiration)?;

        race_broadcast(&self.endpoints, &signed, self.options.timeout).await
    }
}

fn expiration_from_now(lifetime: Duration) -> u32 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    u32::try_from((now + lifetime).as_secs()).unwrap_or(u32::MAX)
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let urls: Vec<&str> = self.endpoints.iter().map(|e| e.url()).collect();
        f.debug_struct("Broadcaster")
            .field("endpoints", &urls)
            .field("options", &self.options)
            .finish()
    }
}
