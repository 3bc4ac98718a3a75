// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
//
//   prepare  — read the log, load images, split, report sizes
//   train    — prepare + train + save (+ optional evaluation)
//   evaluate — reload a saved model and score the test set
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

// Shared data preparation and the prepare-only workflow
pub mod pipeline;

// The training workflow
pub mod train_use_case;

// The test-set evaluation workflow
pub mod evaluate_use_case;
