// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network, training and evaluation code lives here.
//
//   model.rs          — fixed NVIDIA-style CNN:
//                       normalise → crop → 5 conv layers (ReLU)
//                       → flatten → 4 dense layers with dropout
//
//   trainer.rs        — Adam + MSE training loop with a
//                       validation pass every epoch
//
//   early_stopping.rs — stops when validation loss stalls
//
//   evaluator.rs      — loads a saved model and measures test MSE
//
//   backend.rs        — runtime choice between WGPU and ndarray
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Bojarski et al. (2016) End to End Learning for Self-Driving Cars

/// Steering regression network
pub mod model;

/// Training loop with validation and early stopping
pub mod trainer;

/// Patience-based early stopping on validation loss
pub mod early_stopping;

/// Test-set evaluation of a saved model
pub mod evaluator;

/// WGPU / ndarray backend selection
pub mod backend;
