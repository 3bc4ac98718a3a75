// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the driving log on disk to tensor batches.
//
//   driving_log.csv
//       │
//       ▼
//   DrivingLogReader  → parses rows into DrivingRecords
//       │
//       ▼
//   expand_records    → 3 labelled frames per record (Layer 3)
//       │
//       ▼
//   ImageLoader       → decodes the camera images
//       │
//       ▼
//   splitter          → train / validation / test sets
//       │
//       ▼
//   DrivingDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   FrameBatcher      → stacks samples into NCHW tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads driving_log.csv with the csv crate
pub mod log_reader;

/// Decodes camera frames with the image crate
pub mod image_loader;

/// Implements Burn's Dataset trait for camera frames
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded train/test split and tail validation split
pub mod splitter;
