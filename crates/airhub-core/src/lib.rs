//! Wire protocol encoding and decoding for airhub.
//!
//! `airhub-core` implements the controller's binary TCP framing (magic
//! header, addressing, declared length, Modbus CRC16 trailer) and the typed
//! codecs for every message subtype the driver speaks. It has no I/O and no
//! async runtime, so the whole protocol surface is testable from byte
//! fixtures; the transports live in `airhub-net`.
//!
//! # Feature flags
//!
//! - **`std`** (default) — enables `std::error::Error` implementations.
//! - **`alloc`** (default) — enables the buffering stream [`frame::Deframer`].
//! - **`serde`** — derives `Serialize`/`Deserialize` on decoded record types.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/// Modbus-variant CRC16 frame checksum.
pub mod crc;
/// Bounds-checked byte reader/writer primitives.
pub mod encoding;
/// Error types for encoding and decoding operations.
pub mod error;
/// Frame assembly, parsing, and the inbound stream deframer.
pub mod frame;
/// Per-subtype message codecs and inbound dispatch.
pub mod messages;
/// Protocol enums, the keep/set control field type, and value conversions.
pub mod types;

pub use error::{DecodeError, EncodeError};
