//! Memory Allocator Configuration
//!
//! Candidate generation allocates and frees a short string for every
//! attempt, and every trial decryption allocates its key and plaintext
//! buffers. mimalloc keeps these small, short-lived allocations cheap and
//! scales across the worker threads of a parallel attack.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
