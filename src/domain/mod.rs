// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing a driving
// log: records, cameras and labelled frames.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Driving log rows, cameras and the steering correction
pub mod driving_record;

// Core abstractions (traits) that other layers implement
pub mod traits;
