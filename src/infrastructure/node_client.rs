use crate::domain::errors::NodeClientError;
use crate::domain::models::{ChainRecord, NetworkProperties, TransferQuery};

/// A trait representing a client for the Symbol node's REST gateway.
///
/// Everything above this seam is protocol-agnostic: the aggregation pass
/// only sees [`NetworkProperties`] and [`ChainRecord`] values.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait NodeClient {
    /// Retrieves the network configuration slice this service consumes.
    ///
    /// # Returns
    ///
    /// * `Result<NetworkProperties, NodeClientError>` - The properties if
    ///   successful, or an error if the operation fails.
    async fn network_properties(&self) -> Result<NetworkProperties, NodeClientError>;

    /// Retrieves one page of confirmed transfer transactions for the given
    /// query, ordered newest-first. Pages beyond the first are never
    /// requested.
    ///
    /// # Arguments
    ///
    /// * `query` - Address, mosaic id, and page size restricting the search.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<ChainRecord>, NodeClientError>` - The page contents if
    ///   successful, or an error if the operation fails.
    async fn confirmed_transfers(
        &self,
        query: &TransferQuery,
    ) -> Result<Vec<ChainRecord>, NodeClientError>;
}
