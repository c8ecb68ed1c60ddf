// Copyright 2020 - developers of the `tdcore` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Implementation of the [Mobile Transport Protocol]. This layer is
//! responsible for converting zero or more input requests into outgoing
//! messages, and to process the response.
//!
//! A distinction between plain and encrypted is made for simplicity (the
//! plain hardly requires to process any state) and to help prevent invalid
//! states (encrypted communication cannot be made without an authorization
//! key).
//!
//! [Mobile Transport Protocol]: https://core.telegram.org/mtproto/description

mod encrypted;
mod plain;

pub use encrypted::{Builder, Encrypted};
pub use plain::Plain;

pub use crate::errors::{DeserializeError, RequestError, RpcError};
use crate::MsgId;

/// The result of successfully deserializing a server response.
#[derive(Debug, Default)]
pub struct Deserialization {
    /// Responses to previously-enqueued requests, paired with the
    /// [`MsgId`] that was returned when the request was pushed.
    pub rpc_results: Vec<(MsgId, Result<Vec<u8>, RequestError>)>,

    /// Raw, still-serialized `Updates` bodies. The caller is expected to
    /// hand these to the update sequencer.
    pub updates: Vec<Vec<u8>>,
}

/// Transforms a stream of application requests into outgoing messages and
/// parses incoming server responses back into their constituent parts.
///
/// Implementations are not required to be able to accept more than one
/// request at a time (see [`Plain`]), but [`Encrypted`] batches as many
/// as fit in a single container.
pub trait Mtp {
    /// Serializes `request` into the internal buffer, returning the
    /// [`MsgId`] that will identify its response, or `None` if the
    /// request could not be enqueued (buffer full, or the connection is
    /// momentarily unable to accept content-related messages).
    fn push(&mut self, request: &[u8]) -> Option<MsgId>;

    /// Finalizes the internal buffer into a single payload ready to be
    /// handed to a [transport](crate::transport::Transport). Returns an
    /// empty vector if nothing was pushed since the last call.
    fn finalize(&mut self) -> Vec<u8>;

    /// Processes a deframed payload received from the server.
    fn deserialize(&mut self, payload: &[u8]) -> Result<Deserialization, DeserializeError>;
}
