// Copyright 2020 - developers of the `tdcore` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This library is an implementation of the [Mobile Transport Protocol].
//!
//! It is split into three cooperating layers:
//!
//! * [`authentication`] drives the Diffie-Hellman handshake that produces
//!   an authorization key for a data center.
//! * [`mtp`] packs enqueued requests into message containers, encrypts
//!   them, and processes the server's responses to maintain a correct
//!   session state ([`mtp::Plain`] before a key exists, [`mtp::Encrypted`]
//!   afterwards).
//! * [`transport`] frames the bytes produced by the MTP layer (and
//!   deframes the bytes read back) over the wire.
//!
//! [Mobile Transport Protocol]: https://core.telegram.org/mtproto

pub mod authentication;
pub mod errors;
mod manual_tl;
pub mod mtp;
pub mod transport;
mod utils;

/// The default compression threshold to be used: requests whose body is at
/// least this many bytes are gzip-compressed if doing so saves space.
pub const DEFAULT_COMPRESSION_THRESHOLD: Option<usize> = Some(512);

/// A Message Identifier.
///
/// When requests are enqueued, a new associated message identifier is
/// returned. As server responses get processed, some of them will be a
/// response to a previous request. The identifier returned alongside a
/// response can be compared against previously enqueued requests to know
/// which of them it corresponds to.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct MsgId(pub(crate) i64);

impl MsgId {
    /// The raw `msg_id` value as it is transmitted on the wire.
    pub fn value(&self) -> i64 {
        self.0
    }
}
