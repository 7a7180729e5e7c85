use std::sync::Arc;

use chrono::Local;
use tokio::sync::RwLock;
use typed_builder::TypedBuilder;

use super::aggregator::{aggregate, normalize};
use crate::domain::errors::AggregatorError;
use crate::domain::models::{DashboardStats, DashboardView, TransferQuery};
use crate::infrastructure::loading::LoadingGauge;
use crate::infrastructure::node_client::NodeClient;

#[async_trait::async_trait]
pub trait Application {
    /// Runs one fetch-and-aggregate pass and publishes its result.
    async fn refresh(&self) -> Result<(), AggregatorError>;
    /// Current dashboard value plus the loading flag.
    async fn dashboard(&self) -> DashboardView;
}

#[derive(TypedBuilder)]
pub struct App<C> {
    client: C,
    query: TransferQuery,
    #[builder(default)]
    stats: RwLock<DashboardStats>,
    #[builder(default)]
    loading: Arc<LoadingGauge>,
}

#[async_trait::async_trait]
impl<C> Application for App<C>
where
    C: NodeClient + Send + Sync,
{
    async fn refresh(&self) -> Result<(), AggregatorError> {
        let _guard = self.loading.enter();

        // Epoch adjustment is re-fetched every pass; the search depends on
        // it, so the two calls are sequential.
        let properties = self.client.network_properties().await?;
        let epoch_adjustment_secs = properties.epoch_adjustment_secs()?;
        let records = self.client.confirmed_transfers(&self.query).await?;
        let transactions = normalize(&records, epoch_adjustment_secs)?;
        let stats = aggregate(&transactions, &Local::now());

        // Overlapping passes are not fenced: the last one to complete wins,
        // and a failed pass returns here without touching the stats.
        *self.stats.write().await = stats;
        tracing::info!(matching = transactions.len(), "Refresh pass complete");
        Ok(())
    }

    async fn dashboard(&self) -> DashboardView {
        DashboardView {
            loading: self.loading.is_loading(),
            stats: self.stats.read().await.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::NodeClientError;
    use crate::domain::models::{ChainRecord, NetworkProperties, RecordBody, TRACKED_MESSAGE};
    use crate::infrastructure::node_client::MockNodeClient;
    use tokio::sync::{mpsc, Semaphore};

    fn test_query() -> TransferQuery {
        TransferQuery {
            address: "NDHD4RURCULDJ6EXEJ675MS3QHCMTTFTWFG5IDQ".to_string(),
            mosaic_id: "606F8854012B0C0F".to_string(),
            page_size: 100,
        }
    }

    fn tracked_record(hash: &str, millis: u64) -> ChainRecord {
        ChainRecord {
            hash: Some(hash.to_string()),
            timestamp_millis: Some(millis),
            body: RecordBody::Transfer {
                message: Some(TRACKED_MESSAGE.to_string()),
            },
        }
    }

    fn properties() -> NetworkProperties {
        NetworkProperties {
            epoch_adjustment: Some("0s".to_string()),
        }
    }

    #[tokio::test]
    async fn refresh_publishes_aggregated_stats() {
        let millis = chrono::Utc::now().timestamp_millis() as u64;
        let mut client = MockNodeClient::new();
        client
            .expect_network_properties()
            .times(1)
            .returning(|| Ok(properties()));
        client
            .expect_confirmed_transfers()
            .times(1)
            .returning(move |_| Ok(vec![tracked_record("A1", millis)]));

        let app = App::builder().client(client).query(test_query()).build();
        app.refresh().await.unwrap();

        let view = app.dashboard().await;
        assert!(!view.loading);
        assert_eq!(view.stats.daily_counts.iter().sum::<u64>(), 1);
        assert_eq!(view.stats.recent_transactions.len(), 1);
        assert_eq!(view.stats.recent_transactions[0].hash, "A1");
    }

    #[tokio::test]
    async fn failed_pass_keeps_previous_stats() {
        let mut client = MockNodeClient::new();
        let mut seq = mockall::Sequence::new();
        client
            .expect_network_properties()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(properties()));
        client
            .expect_confirmed_transfers()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![tracked_record("A1", 1000)]));
        client
            .expect_network_properties()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(NodeClientError::FailedRequest("boom".to_string())));

        let app = App::builder().client(client).query(test_query()).build();
        app.refresh().await.unwrap();
        let before = app.dashboard().await.stats;

        let result = app.refresh().await;
        assert!(matches!(result, Err(AggregatorError::FailedNodeClient(_))));

        let after = app.dashboard().await;
        assert!(!after.loading);
        assert_eq!(after.stats, before);
    }

    #[tokio::test]
    async fn malformed_page_aborts_without_publishing() {
        let mut client = MockNodeClient::new();
        client
            .expect_network_properties()
            .times(1)
            .returning(|| Ok(properties()));
        client.expect_confirmed_transfers().times(1).returning(|_| {
            Ok(vec![ChainRecord {
                hash: None,
                timestamp_millis: Some(1000),
                body: RecordBody::Transfer {
                    message: Some(TRACKED_MESSAGE.to_string()),
                },
            }])
        });

        let app = App::builder().client(client).query(test_query()).build();
        let result = app.refresh().await;
        assert!(matches!(
            result,
            Err(AggregatorError::MissingTransactionHash)
        ));

        let view = app.dashboard().await;
        assert!(!view.loading);
        assert_eq!(view.stats, DashboardStats::default());
    }

    /// Client whose first call parks until the test hands out a permit, so
    /// passes can be held in flight deterministically.
    struct GatedClient {
        entered: mpsc::UnboundedSender<()>,
        release: Arc<Semaphore>,
    }

    #[async_trait::async_trait]
    impl NodeClient for GatedClient {
        async fn network_properties(&self) -> Result<NetworkProperties, NodeClientError> {
            let _ = self.entered.send(());
            let permit = self.release.acquire().await.expect("semaphore closed");
            permit.forget();
            Ok(properties())
        }

        async fn confirmed_transfers(
            &self,
            _query: &TransferQuery,
        ) -> Result<Vec<ChainRecord>, NodeClientError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn overlapping_refreshes_hold_loading_until_both_complete() {
        let (entered, mut entries) = mpsc::unbounded_channel();
        let release = Arc::new(Semaphore::new(0));
        let app = Arc::new(
            App::builder()
                .client(GatedClient {
                    entered,
                    release: release.clone(),
                })
                .query(test_query())
                .build(),
        );

        let mut first = tokio::spawn({
            let app = app.clone();
            async move { app.refresh().await }
        });
        let mut second = tokio::spawn({
            let app = app.clone();
            async move { app.refresh().await }
        });

        entries.recv().await.expect("first pass entered");
        entries.recv().await.expect("second pass entered");
        assert!(app.dashboard().await.loading);

        // One permit finishes exactly one pass; the other is still parked,
        // so the view must stay loading.
        release.add_permits(1);
        let remaining = tokio::select! {
            done = &mut first => {
                done.unwrap().unwrap();
                &mut second
            }
            done = &mut second => {
                done.unwrap().unwrap();
                &mut first
            }
        };
        assert!(app.dashboard().await.loading);

        release.add_permits(1);
        remaining.await.unwrap().unwrap();
        assert!(!app.dashboard().await.loading);
    }
}
