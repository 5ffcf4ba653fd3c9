use crate::types::NodeAddr;

/// Errors raised by the PCER routing core.
///
/// "No usable neighbor" is not an error. It is an ordinary outcome,
/// `RouteDecision::NoRoute`.
#[derive(Debug, thiserror::Error)]
pub enum PcerError {
    #[error("invalid metrics for neighbor {neighbor}: {reason}")]
    InvalidMetrics { neighbor: NodeAddr, reason: String },

    #[error("invalid node address: {0}")]
    InvalidAddress(String),

    #[error("unknown urgency class: {0}")]
    UnknownUrgency(String),

    #[error("hop limit exhausted for packet {packet_id}")]
    TtlExhausted { packet_id: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl From<rmp_serde::encode::Error> for PcerError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        PcerError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for PcerError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        PcerError::Deserialization(e.to_string())
    }
}
