// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to its inputs through traits so
// the concrete file formats stay in Layer 4.
//
//   - DrivingLogReader implements RecordSource (CSV on disk)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::driving_record::DrivingRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the rows of a driving log.
pub trait RecordSource {
    /// Load every record available from this source, in log order.
    fn load_all(&self) -> Result<Vec<DrivingRecord>>;
}
