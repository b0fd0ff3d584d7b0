//! Mirror-node log polling: the out-of-band verification path.
//!
//! The mirror node indexes ledger events asynchronously, so everything
//! here is best-effort: failures are logged and swallowed, and the
//! replacement for "sleep five seconds and hope" is a bounded
//! backoff poll with an explicit timeout.

use crate::events::format_event_line;
use anyhow::Result;
use ethers::types::H256;
use ledger_core::{
    poll_until, ContractInterface, DecodedEvent, EntityId, MirrorError, PollConfig, PollOutcome,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct MirrorLogPage {
    #[serde(default)]
    logs: Vec<MirrorLogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorLogEntry {
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub block_number: u64,
    #[serde(default)]
    pub transaction_hash: String,
}

pub struct MirrorClient {
    http: reqwest::Client,
    base_url: String,
}

impl MirrorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn logs_url(&self, contract: EntityId) -> String {
        format!(
            "{}/api/v1/contracts/{}/results/logs?order=desc&limit=1",
            self.base_url, contract
        )
    }

    /// Fetches the most recent log for `contract`, if any.
    pub async fn fetch_latest_log(
        &self,
        contract: EntityId,
    ) -> Result<Option<MirrorLogEntry>, MirrorError> {
        let url = self.logs_url(contract);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| MirrorError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let page: MirrorLogPage =
            response.json().await.map_err(|e| MirrorError::BadPayload {
                url,
                reason: e.to_string(),
            })?;

        Ok(page.logs.into_iter().next())
    }

    /// Decodes and prints the latest indexed event for `contract`.
    /// Best-effort: any failure is logged and the function returns
    /// normally, never affecting the caller's outcome.
    pub async fn check_last_event(&self, factory: &ContractInterface, contract: EntityId) {
        match self.try_decode_latest(factory, contract).await {
            Ok(Some((entry, event))) => {
                info!(
                    "{}",
                    format_event_line(entry.block_number, &entry.transaction_hash, &event)
                );
            }
            Ok(None) => info!("No decodable mirror logs yet for {}", contract),
            Err(e) => warn!("Mirror check for {} failed: {}", contract, e),
        }
    }

    /// Polls until the mirror node has indexed a decodable event for
    /// `contract`, with backoff, an explicit deadline and cancellation.
    pub async fn wait_for_log(
        &self,
        factory: &ContractInterface,
        contract: EntityId,
        config: PollConfig,
        token: &CancellationToken,
    ) -> PollOutcome<DecodedEvent> {
        poll_until(config, "mirror log", token, || async {
            let decoded = self.try_decode_latest(factory, contract).await?;
            Ok(decoded.map(|(_, event)| event))
        })
        .await
    }

    async fn try_decode_latest(
        &self,
        factory: &ContractInterface,
        contract: EntityId,
    ) -> Result<Option<(MirrorLogEntry, DecodedEvent)>> {
        let Some(entry) = self.fetch_latest_log(contract).await? else {
            return Ok(None);
        };
        // entries the indexer has seen but not populated yet
        if entry.data.is_empty() || entry.data == "0x" {
            return Ok(None);
        }

        let data = hex::decode(entry.data.trim_start_matches("0x"))?;
        let topics = entry
            .topics
            .iter()
            .map(|t| t.parse::<H256>())
            .collect::<Result<Vec<_>, _>>()?;

        let event = factory.parse_log(topics, data)?;
        Ok(Some((entry, event)))
    }
}
