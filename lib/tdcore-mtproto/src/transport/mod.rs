// Copyright 2020 - developers of the `tdcore` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Implementation of the several [MTProto transports]. This layer is
//! responsible for taking serialized messages from the MTP and packing them
//! in a format that can be sent over a protocol, such as TCP, HTTP or UDP.
//!
//! [MTProto transports]: https://core.telegram.org/mtproto#mtproto-transport
mod abridged;
mod full;
mod intermediate;
mod obfuscated;

pub use abridged::Abridged;
pub use full::Full;
pub use intermediate::Intermediate;
pub use obfuscated::Obfuscated;
use std::fmt;

use tdcore_crypto::RingBuffer;

/// The error type reported by the different transports when something is wrong.
///
/// Certain transports will only produce certain variants of this error.
///
/// Unless the variant is `MissingBytes`, the connection should not continue.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Not enough bytes are provided.
    MissingBytes,

    /// The length is either too short or too long to represent a valid packet.
    BadLen { got: i32 },

    /// The sequence number received does not match the expected value.
    BadSeq { expected: i32, got: i32 },

    /// The checksum of the packet does not match its expected value.
    BadCrc { expected: u32, got: u32 },

    /// The server reported a negative-length packet, used to signal an
    /// HTTP-style status code instead of a regular payload.
    BadStatus { status: u32 },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error: ")?;
        match self {
            Error::MissingBytes => write!(f, "need more bytes"),
            Error::BadLen { got } => write!(f, "bad len (got {})", got),
            Error::BadSeq { expected, got } => {
                write!(f, "bad seq (expected {}, got {})", expected, got)
            }
            Error::BadCrc { expected, got } => {
                write!(f, "bad crc (expected {}, got {})", expected, got)
            }
            Error::BadStatus { status } => write!(f, "bad status ({})", status),
        }
    }
}

/// The byte offsets of a single deframed message within an `unpack`ed buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnpackedOffset {
    /// Offset where the message payload starts.
    pub data_start: usize,

    /// Offset right after the message payload ends.
    pub data_end: usize,

    /// Offset of the next message (or unused trailing bytes) in the buffer.
    pub next_offset: usize,
}

/// Transports that can be wrapped by [`Obfuscated`] must expose the four
/// bytes identifying them, used as part of the obfuscation handshake.
pub trait Tagged {
    /// Returns the tag identifying this transport, and marks it as sent so
    /// future packets don't repeat it.
    fn init_tag(&mut self) -> [u8; 4];
}

/// The trait used by the transports to pack and unpack MTProto messages.
pub trait Transport {
    /// Packs the contents of `buffer` in place, prepending whatever header
    /// the transport requires.
    ///
    /// Panics if the buffer's length is not divisible by 4.
    fn pack(&mut self, buffer: &mut RingBuffer<u8>);

    /// Unpacks a single message out of `buffer`, returning the offsets of
    /// its payload and of the next message (if any) on success.
    fn unpack(&mut self, buffer: &mut [u8]) -> Result<UnpackedOffset, Error>;

    /// Resets any per-connection state (sequence numbers, sent tags, keys)
    /// back to how it was when the transport was first created.
    fn reset(&mut self);
}
