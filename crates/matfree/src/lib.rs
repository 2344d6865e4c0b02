// Re-export everything from matfree-core
pub use matfree_core::*;

// Re-export the composites
pub use matfree_compose::{Dictionary, Kron};
