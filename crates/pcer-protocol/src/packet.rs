/// Packet header carried between PCER nodes.
///
/// Wire format: MessagePack. The urgency tag is an optional single byte;
/// when absent the packet is treated as Standard.
use serde::{Deserialize, Serialize};

use crate::error::PcerError;
use crate::types::{NodeAddr, DEFAULT_TTL};
use crate::urgency::UrgencyClass;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketHeader {
    /// Sequence number assigned by the originator.
    pub id: u64,
    pub source: NodeAddr,
    pub destination: NodeAddr,
    /// Payload size in bytes.
    pub size: u32,
    /// Raw urgency tag, kept as received so unknown values survive
    /// relaying unchanged.
    #[serde(default)]
    pub urgency: Option<u8>,
    /// Remaining hop budget.
    pub ttl: u8,
}

impl PacketHeader {
    pub fn new(id: u64, source: NodeAddr, destination: NodeAddr, size: u32) -> Self {
        Self {
            id,
            source,
            destination,
            size,
            urgency: None,
            ttl: DEFAULT_TTL,
        }
    }

    /// Attach an urgency class. Set once at origination.
    pub fn with_urgency(mut self, class: UrgencyClass) -> Self {
        self.urgency = Some(class.tag());
        self
    }

    /// Attach a raw tag byte, as read from a trace or the wire.
    pub fn with_tag(mut self, tag: u8) -> Self {
        self.urgency = Some(tag);
        self
    }

    pub fn with_ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    /// Decoded urgency class.
    pub fn urgency(&self) -> UrgencyClass {
        UrgencyClass::from_tag_opt(self.urgency)
    }

    /// Consume one hop. Fails once the budget is spent.
    pub fn decrement_ttl(&mut self) -> Result<(), PcerError> {
        if self.ttl == 0 {
            return Err(PcerError::TtlExhausted { packet_id: self.id });
        }
        self.ttl -= 1;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PcerError> {
        rmp_serde::to_vec_named(self).map_err(Into::into)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, PcerError> {
        rmp_serde::from_slice(data).map_err(Into::into)
    }
}
