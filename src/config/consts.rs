/// Temporal overhead charged for one index maintenance operation
pub const INDEX_OPERATION_COST: u32 = 1;
/// Spatial overhead of one index entry
pub const INDEX_ENTRY_FOOTPRINT: u32 = 1;
/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Terminal property: how many transcript entries to keep
pub const TRANSCRIPT_LIMIT_PROPERTY: &str = "transcript_limit";
/// Transcript entries a terminal keeps when no limit is configured
pub const DEFAULT_TRANSCRIPT_LIMIT: usize = 1000;
/// Loopback property: name of the attribute marking an echoed message
pub const ACK_ATTRIBUTE_PROPERTY: &str = "ack_attribute";
