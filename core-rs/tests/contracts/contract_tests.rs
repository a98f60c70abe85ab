//! Contract Tests - Translation Invariant Protection
//!
//! This file aggregates all contract test modules.
//! Contract tests verify invariants of the compiled SPARQL and the response
//! document that downstream tooling depends on.

// Contract test modules
mod contracts {
    // Question -> SPARQL contracts
    mod compilation {
        include!("compilation_contracts.rs");
    }

    // Justification -> response XML contracts
    mod response {
        include!("response_contracts.rs");
    }
}
