/*!
 * Core Types
 * Common types used across the allocator
 */

/// Byte offset from the start of an arena
pub type Offset = usize;

/// Size type for memory operations
pub type Size = usize;

/// Absolute address type, used when classifying caller-supplied pointers
pub type Address = usize;
