//! Domain entities for cursorlink.
//!
//! Pure value types with no infrastructure dependencies. The display-server
//! adapter produces a [`sample::RawPosition`]; everything downstream of that
//! only ever sees a clamped [`sample::PointerSample`].

/// Pointer positions, target resolution, and the coordinate clamp.
pub mod sample;
