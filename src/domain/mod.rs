// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing the problem:
// dated images, before/after pairs, and test rows.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Think of this layer as the "dictionary" of the system:
// it defines what things ARE, not how they work.

// A single dated image and the species it belongs to
pub mod image_record;

// Before/after pairs for training and for the test table
pub mod pair;

// Core abstractions (traits) that other layers implement
pub mod traits;
