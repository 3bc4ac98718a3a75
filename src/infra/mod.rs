// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by the training and
// evaluation workflows:
//
//   checkpoint.rs — model weights (Burn gzipped MessagePack) plus
//                   the run config and training report as JSON,
//                   so evaluation can rebuild the exact network
//                   and the exact train/test split.
//
//   metrics.rs    — per-epoch learning curve written to CSV.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
