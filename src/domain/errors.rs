use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("network properties carry no epochAdjustment")]
    MissingEpochAdjustment,
    #[error("malformed epochAdjustment value {0:?}")]
    MalformedEpochAdjustment(String),
    #[error("confirmed transaction without hash")]
    MissingTransactionHash,
    #[error("confirmed transaction without timestamp")]
    MissingTransactionTimestamp,
    #[error("transaction timestamp out of range: {0} ms")]
    TimestampOutOfRange(i64),
    #[error("node client failure")]
    FailedNodeClient(#[from] NodeClientError),
}

#[derive(Error, Debug)]
pub enum NodeClientError {
    #[error("request to node failed: {0}")]
    FailedRequest(String),
    #[error("unexpected node response: {0}")]
    MalformedResponse(String),
}
