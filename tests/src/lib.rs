//! # Keystone Test Suite
//!
//! Unified test crate exercising the kernel crates together, the way a
//! host process uses them.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Shared fixtures (probe modules, flaky ops)
//! │
//! └── integration/      # Cross-crate flows
//!     ├── lifecycle.rs  # Init, destroy, state events
//!     ├── execution.rs  # Timeouts, retries, classification
//!     ├── events.rs     # Bus ordering, once, isolation
//!     ├── caching.rs    # TTL, LRU, read-through
//!     └── registry.rs   # Multi-module hosts
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p keystone-tests
//!
//! # By category
//! cargo test -p keystone-tests integration::lifecycle
//! cargo test -p keystone-tests integration::execution
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]
