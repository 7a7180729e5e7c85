use serde::Deserialize;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    Retry,
};

use crate::domain::errors::NodeClientError;
use crate::domain::models::{ChainRecord, NetworkProperties, RecordBody, TransferQuery};

use super::node_client::NodeClient;

/// Transaction type code the gateway uses for transfer transactions.
const TRANSFER_TYPE: u16 = 0x4154;

/// A client for a Symbol REST gateway.
#[derive(Clone)]
pub struct SymbolRestClient {
    http: reqwest::Client,
    base_url: String,
}

impl SymbolRestClient {
    /// Creates a new `SymbolRestClient` instance from the given gateway URL.
    ///
    /// # Arguments
    ///
    /// * `node_url` - The URL of the Symbol REST gateway.
    ///
    /// # Returns
    ///
    /// A new `SymbolRestClient` instance.
    pub fn from_url(node_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: node_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_properties(&self) -> Result<NetworkPropertiesDto, NodeClientError> {
        let url = format!("{}/network/properties", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| NodeClientError::FailedRequest(e.to_string()))?;
        response
            .json::<NetworkPropertiesDto>()
            .await
            .map_err(|e| NodeClientError::MalformedResponse(e.to_string()))
    }

    async fn fetch_transfers(
        &self,
        query: &TransferQuery,
    ) -> Result<TransactionPageDto, NodeClientError> {
        let url = format!("{}/transactions/confirmed", self.base_url);
        let params = [
            ("address", query.address.clone()),
            ("transferMosaicId", query.mosaic_id.clone()),
            ("pageSize", query.page_size.to_string()),
            ("order", "desc".to_string()),
        ];
        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| NodeClientError::FailedRequest(e.to_string()))?;
        response
            .json::<TransactionPageDto>()
            .await
            .map_err(|e| NodeClientError::MalformedResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl NodeClient for SymbolRestClient {
    /// Retrieves `network.epochAdjustment` and nothing else from the
    /// gateway's network properties.
    async fn network_properties(&self) -> Result<NetworkProperties, NodeClientError> {
        let retry_strategy = ExponentialBackoff::from_millis(500).map(jitter).take(3);

        let dto = Retry::spawn(retry_strategy, || self.fetch_properties()).await?;
        Ok(NetworkProperties {
            epoch_adjustment: dto.network.epoch_adjustment,
        })
    }

    /// Retrieves one newest-first page of confirmed transfers restricted to
    /// the query's address and mosaic id.
    async fn confirmed_transfers(
        &self,
        query: &TransferQuery,
    ) -> Result<Vec<ChainRecord>, NodeClientError> {
        let retry_strategy = ExponentialBackoff::from_millis(500).map(jitter).take(3);

        let page = Retry::spawn(retry_strategy, || self.fetch_transfers(query)).await?;
        page.data
            .into_iter()
            .map(TransactionEnvelopeDto::into_record)
            .collect()
    }
}

/// Decodes a gateway message payload. Payloads are hex with a one-byte
/// type prefix; only `0x00` (plain text) is meaningful here, anything else
/// decodes to `None` and counts as non-matching.
fn decode_message(raw: &str) -> Option<String> {
    let bytes = hex::decode(raw).ok()?;
    match bytes.split_first() {
        Some((0x00, text)) => String::from_utf8(text.to_vec()).ok(),
        _ => None,
    }
}

#[derive(Deserialize)]
struct NetworkPropertiesDto {
    network: NetworkSectionDto,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkSectionDto {
    epoch_adjustment: Option<String>,
}

#[derive(Deserialize)]
struct TransactionPageDto {
    data: Vec<TransactionEnvelopeDto>,
}

#[derive(Deserialize)]
struct TransactionEnvelopeDto {
    meta: Option<TransactionMetaDto>,
    transaction: TransactionBodyDto,
}

#[derive(Deserialize)]
struct TransactionMetaDto {
    hash: Option<String>,
    /// Network-relative milliseconds, serialized as a decimal string
    timestamp: Option<String>,
}

#[derive(Deserialize)]
struct TransactionBodyDto {
    #[serde(rename = "type")]
    entry_type: u16,
    /// Hex-encoded message payload, absent when the transfer carried none
    message: Option<String>,
}

impl TransactionEnvelopeDto {
    fn into_record(self) -> Result<ChainRecord, NodeClientError> {
        let (hash, timestamp_millis) = match self.meta {
            Some(meta) => {
                let millis = meta
                    .timestamp
                    .map(|raw| {
                        raw.parse::<u64>().map_err(|_| {
                            NodeClientError::MalformedResponse(format!(
                                "non-numeric timestamp {raw:?}"
                            ))
                        })
                    })
                    .transpose()?;
                (meta.hash, millis)
            }
            None => (None, None),
        };
        let body = if self.transaction.entry_type == TRANSFER_TYPE {
            RecordBody::Transfer {
                message: self.transaction.message.as_deref().and_then(decode_message),
            }
        } else {
            RecordBody::Other
        };
        Ok(ChainRecord {
            hash,
            timestamp_millis,
            body,
        })
    }
}
