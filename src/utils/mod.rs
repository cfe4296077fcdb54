//! # Utility Functions and Types
//!
//! This module provides common utility functions and types used throughout the flvio library.
//! It includes implementations for:
//!
//! - Bit-level reading of codec payloads
//! - Bit-level writing, including exponential Golomb encoding
//!
//! ## Bit Operations
//!
//! The bits module provides utilities for working with bit-level data:
//!
//! ```rust
//! use flvio::utils::BitReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = vec![0b10110011u8];
//! let mut reader = BitReader::new(&data);
//!
//! // Read specific number of bits
//! let value = reader.read_bits(3)?; // Reads first 3 bits (101)
//! assert_eq!(value, 0b101);
//! # Ok(())
//! # }
//! ```

/// Bit manipulation and bitstream reading/writing utilities
pub mod bits;

// Re-export commonly used types
pub use bits::*;
