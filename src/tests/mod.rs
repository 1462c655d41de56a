//! Unit tests for registry semantics, topology derivation and
//! specification loading.

mod loader;
