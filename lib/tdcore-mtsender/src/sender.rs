// Copyright 2020 - developers of the `tdcore` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Owns a connection, drives its [`Mtp`] state machine, and demultiplexes
//! the results back to whoever enqueued the corresponding request.
//!
//! A [`Sender`] does not know anything about data centers, sessions, or
//! reconnection beyond the single attempt made while establishing it; the
//! [`crate::sender_pool`] module is the layer that owns one sender per data
//! center and re-creates them as needed.

use std::io;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::SystemTime;
use std::thread;

use log::{debug, info, warn};
use tdcore_crypto::RingBuffer;
use tdcore_mtproto::mtp::{self, Mtp};
use tdcore_mtproto::transport::{self, Transport};
use tdcore_mtproto::{MsgId, authentication};
use tdcore_session::UpdatesLike;
use tdcore_tl_types::{self as tl, Deserializable, RemoteCall, Serializable};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use web_time::Instant;

use crate::errors::{AuthorizationError, InvocationError, ReadError, RpcError};
use crate::net::{NetStream, ServerAddr};
use crate::reconnection::ReconnectionPolicy;
use crate::utils::{sleep, sleep_until};

/// The maximum data that we're willing to send or receive at once.
///
/// Telegram closes the connection after roughly a megabyte of data, so to
/// account for the transports' own overhead we add a few extra kilobytes.
const MAXIMUM_DATA: usize = (1024 * 1024) + (8 * 1024);

/// Every how often are keep-alive pings sent.
const PING_DELAY: std::time::Duration = std::time::Duration::from_secs(60);

/// After how many seconds without further pings the server should close
/// the connection. This leaves `NO_PING_DISCONNECT - PING_DELAY` seconds of
/// slack for a ping to make it through before the server gives up on us.
const NO_PING_DISCONNECT: i32 = 75;

/// Generates a best-effort unique identifier, good enough for ping IDs.
pub(crate) fn generate_random_id() -> i64 {
    static LAST_ID: AtomicI64 = AtomicI64::new(0);

    while LAST_ID.load(Ordering::SeqCst) == 0 {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("system time is before epoch")
            .as_nanos() as i64;

        if LAST_ID
            .compare_exchange(0, now, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            thread::yield_now();
        }
    }

    LAST_ID.fetch_add(1, Ordering::SeqCst)
}

/// Owns a transport and a [`Mtp`] instance, turning enqueued application
/// requests into wire traffic and wire traffic back into resolved results
/// and updates.
pub struct Sender<T: Transport, M: Mtp> {
    stream: NetStream,
    transport: T,
    mtp: M,
    addr: ServerAddr,
    requests: Vec<Request>,
    next_ping: Instant,

    read_buffer: Vec<u8>,
    read_tail: usize,
    write_buffer: RingBuffer<u8>,
    write_head: usize,
}

struct Request {
    body: Vec<u8>,
    state: RequestState,
    result: oneshot::Sender<Result<Vec<u8>, InvocationError>>,
}

#[derive(Clone, Copy, Debug)]
enum RequestState {
    NotSerialized,
    Serialized(MsgId),
    Sent(MsgId),
}

impl<T: Transport, M: Mtp> Sender<T, M> {
    /// Opens a new connection to `addr`, retrying the TCP dial according to
    /// `policy`. This does not perform any MTProto-level handshake; the
    /// caller decides whether `mtp` is a [`mtp::Plain`] (to then call
    /// [`generate_auth_key`]) or an already-keyed [`mtp::Encrypted`].
    pub async fn connect(
        transport: T,
        mtp: M,
        addr: ServerAddr,
        policy: &dyn ReconnectionPolicy,
    ) -> Result<Self, io::Error> {
        let stream = dial(&addr, policy).await?;
        Ok(Self {
            stream,
            transport,
            mtp,
            addr,
            requests: Vec::new(),
            next_ping: Instant::now() + PING_DELAY,
            read_buffer: vec![0; MAXIMUM_DATA],
            read_tail: 0,
            write_buffer: RingBuffer::with_capacity(MAXIMUM_DATA, 0),
            write_head: 0,
        })
    }

    /// Serializes `request`, enqueues it, and drives [`Self::step`] until its
    /// response arrives.
    pub async fn invoke<R: RemoteCall>(&mut self, request: &R) -> Result<R::Return, InvocationError> {
        let body = self.invoke_raw(request.to_bytes()).await?;
        R::Return::from_bytes(&body).map_err(InvocationError::from)
    }

    async fn invoke_raw(&mut self, body: Vec<u8>) -> Result<Vec<u8>, InvocationError> {
        let (tx, mut rx) = oneshot::channel();
        self.enqueue_body(body, tx);
        loop {
            self.step().await?;
            match rx.try_recv() {
                Ok(result) => break result,
                Err(TryRecvError::Empty) => continue,
                Err(TryRecvError::Closed) => {
                    panic!("request channel dropped before a result was produced")
                }
            }
        }
    }

    pub(crate) fn enqueue_body(
        &mut self,
        body: Vec<u8>,
        result: oneshot::Sender<Result<Vec<u8>, InvocationError>>,
    ) {
        assert!(body.len() >= 4);
        let req_id = u32::from_le_bytes([body[0], body[1], body[2], body[3]]);
        debug!("enqueueing request {} to be serialized", tl::name_for_id(req_id));
        self.requests.push(Request {
            body,
            state: RequestState::NotSerialized,
            result,
        });
    }

    /// Advances the connection by one step: fills the write buffer with any
    /// pending requests, then waits on whichever of (socket read, socket
    /// write, ping deadline) completes first.
    ///
    /// Returns the updates produced while processing server data, if any.
    /// An error means the connection must be considered dead; the caller
    /// should drop this sender and establish a new one.
    pub async fn step(&mut self) -> Result<Vec<UpdatesLike>, ReadError> {
        self.try_fill_write();

        let (mut reader, mut writer) = self.stream.split();

        let result = tokio::select! {
            n = reader.read(&mut self.read_buffer[self.read_tail..]) => {
                n.map_err(ReadError::Io).and_then(|n| self.on_net_read(n))
            }
            n = writer.write(&self.write_buffer[self.write_head..]), if !self.write_buffer.is_empty() => {
                n.map_err(ReadError::Io).map(|n| {
                    self.on_net_write(n);
                    Vec::new()
                })
            }
            _ = sleep_until(self.next_ping) => {
                self.on_ping_timeout();
                Ok(Vec::new())
            }
        };

        match result {
            Ok(updates) => Ok(updates),
            Err(err) => {
                self.on_error(&err);
                Err(err)
            }
        }
    }

    /// Pushes as many `NotSerialized` requests as the [`Mtp`] will accept
    /// into its internal container and, if anything was pushed, finalizes
    /// and frames the resulting payload — unless a write is already
    /// in-flight, in which case nothing is done until it drains.
    fn try_fill_write(&mut self) {
        if !self.write_buffer.is_empty() {
            return;
        }

        for request in self
            .requests
            .iter_mut()
            .filter(|r| matches!(r.state, RequestState::NotSerialized))
        {
            match self.mtp.push(&request.body) {
                Some(msg_id) => request.state = RequestState::Serialized(msg_id),
                // Container full, or momentarily unable to accept more
                // content-related messages (e.g. a future-salts request is
                // in flight); try again on a later step.
                None => break,
            }
        }

        let payload = self.mtp.finalize();
        if payload.is_empty() {
            return;
        }

        self.write_buffer.clear();
        self.write_buffer.extend(payload);
        self.transport.pack(&mut self.write_buffer);
    }

    /// Handles `n` more bytes being readable, unpacking as many complete
    /// transport frames as the buffer now contains.
    fn on_net_read(&mut self, n: usize) -> Result<Vec<UpdatesLike>, ReadError> {
        if n == 0 {
            return Err(ReadError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "read 0 bytes",
            )));
        }

        self.read_tail += n;

        let mut updates = Vec::new();
        let mut offset = 0;
        while offset != self.read_tail {
            match self.transport.unpack(&mut self.read_buffer[offset..self.read_tail]) {
                Ok(unpacked) => {
                    let deserialization = self.mtp.deserialize(
                        &self.read_buffer[offset + unpacked.data_start..offset + unpacked.data_end],
                    )?;
                    self.process_deserialization(deserialization, &mut updates);
                    offset += unpacked.next_offset;
                }
                Err(transport::Error::MissingBytes) => break,
                Err(err) => return Err(ReadError::Transport(err)),
            }
        }

        self.read_buffer.copy_within(offset..self.read_tail, 0);
        self.read_tail -= offset;

        Ok(updates)
    }

    /// Handles `n` more bytes being written; once the whole buffer has
    /// drained, every `Serialized` request becomes `Sent`.
    fn on_net_write(&mut self, n: usize) {
        self.write_head += n;
        assert!(self.write_head <= self.write_buffer.len());
        if self.write_head != self.write_buffer.len() {
            return;
        }

        self.write_buffer.clear();
        self.write_head = 0;
        for request in self.requests.iter_mut() {
            if let RequestState::Serialized(msg_id) = request.state {
                request.state = RequestState::Sent(msg_id);
            }
        }
    }

    /// Enqueues a keep-alive ping; the server will close the connection if
    /// it does not see one within `NO_PING_DISCONNECT` seconds.
    fn on_ping_timeout(&mut self) {
        let ping_id = generate_random_id();
        debug!("enqueueing keepalive ping {ping_id}");
        let (tx, _rx) = oneshot::channel();
        self.enqueue_body(
            tl::functions::PingDelayDisconnect {
                ping_id,
                disconnect_delay: NO_PING_DISCONNECT,
            }
            .to_bytes(),
            tx,
        );
        self.next_ping = Instant::now() + PING_DELAY;
    }

    /// Fails every pending request with `error`; the connection is dead.
    fn on_error(&mut self, error: &ReadError) {
        warn!(
            "connection failed, failing {} pending request(s): {error}",
            self.requests.len()
        );
        self.requests
            .drain(..)
            .for_each(|r| drop(r.result.send(Err(InvocationError::from(error.clone())))));
    }

    fn process_deserialization(
        &mut self,
        deserialization: mtp::Deserialization,
        updates: &mut Vec<UpdatesLike>,
    ) {
        for (msg_id, result) in deserialization.rpc_results {
            self.process_result(updates, msg_id, result);
        }
        for body in deserialization.updates {
            self.process_update(updates, body);
        }
    }

    fn process_result(
        &mut self,
        updates: &mut Vec<UpdatesLike>,
        msg_id: MsgId,
        result: Result<Vec<u8>, mtp::RequestError>,
    ) {
        let Some(req) = self.pop_request(msg_id) else {
            info!("got a result for {msg_id:?} but no such request is pending");
            return;
        };

        match result {
            Ok(body) => {
                self.extract_own_update(updates, &req.body, &body);
                drop(req.result.send(Ok(body)));
            }
            Err(mtp::RequestError::RPCError(error)) => {
                let caused_by = u32::from_le_bytes([req.body[0], req.body[1], req.body[2], req.body[3]]);
                debug!("request {} failed: {error}", tl::name_for_id(caused_by));
                drop(req.result.send(Err(InvocationError::Rpc(RpcError {
                    code: error.code,
                    name: error.name,
                    value: error.value,
                    caused_by: Some(caused_by),
                }))));
            }
            Err(mtp::RequestError::BadMessage { code }) => {
                debug!("bad message (code {code}) for request {msg_id:?}; re-sending it");
                self.requests.push(Request {
                    body: req.body,
                    state: RequestState::NotSerialized,
                    result: req.result,
                });
            }
            Err(mtp::RequestError::Dropped) => {
                drop(req.result.send(Err(InvocationError::Dropped)));
            }
            Err(mtp::RequestError::Deserialize(error)) => {
                drop(req.result.send(Err(InvocationError::from(error))));
            }
        }
    }

    /// Some RPC responses double as updates (most notably sending a message
    /// produces an `UpdateShortSentMessage`, which lacks enough information
    /// to reconstruct the sent [`tl::types::Message`] without the original
    /// request). These are surfaced here rather than through the generic
    /// update stream, which has no way to recover the original request.
    fn extract_own_update(&self, updates: &mut Vec<UpdatesLike>, request_body: &[u8], response_body: &[u8]) {
        match tl::enums::Updates::from_bytes(response_body) {
            Ok(tl::enums::Updates::UpdateShortSentMessage(update)) => {
                if let Ok(request) = tl::functions::messages::SendMessage::from_bytes(request_body) {
                    updates.push(UpdatesLike::ShortSentMessage { request, update });
                }
                // Already mirrored into the generic update stream by the
                // Mtp layer; nothing else to do for this response.
                return;
            }
            // Every other `Updates` variant arrives a second time through
            // the generic update stream (see `process_update`).
            Ok(_) => return,
            Err(_) => {}
        }

        if let Ok(affected) = tl::types::messages::AffectedMessages::from_bytes(response_body) {
            updates.push(UpdatesLike::AffectedMessages(affected));
            return;
        }

        if let Ok(invited) = tl::types::messages::InvitedUsers::from_bytes(response_body) {
            updates.push(UpdatesLike::InvitedUsers(invited));
        }
    }

    fn process_update(&mut self, updates: &mut Vec<UpdatesLike>, body: Vec<u8>) {
        match tl::enums::Updates::from_bytes(&body) {
            Ok(update) => updates.push(UpdatesLike::Updates(update)),
            Err(e) => warn!("telegram sent an update that failed to deserialize: {e}"),
        }
    }

    fn pop_request(&mut self, msg_id: MsgId) -> Option<Request> {
        let index = self.requests.iter().position(|r| match r.state {
            RequestState::Serialized(id) | RequestState::Sent(id) => id == msg_id,
            RequestState::NotSerialized => false,
        })?;
        Some(self.requests.swap_remove(index))
    }
}

impl<T: Transport> Sender<T, mtp::Encrypted> {
    /// The authorization key currently in use, to be persisted by the
    /// caller alongside the data center it was negotiated with.
    pub fn auth_key(&self) -> [u8; 256] {
        self.mtp.auth_key()
    }
}

/// Dials `addr`, retrying failed attempts according to `policy`.
async fn dial(addr: &ServerAddr, policy: &dyn ReconnectionPolicy) -> Result<NetStream, io::Error> {
    let mut attempts = 0usize;
    loop {
        match NetStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(err) => match policy.should_retry(attempts) {
                ControlFlow::Continue(delay) => {
                    warn!("connection attempt {attempts} to {addr:?} failed: {err}; retrying in {delay:?}");
                    sleep(delay).await;
                    attempts += 1;
                }
                ControlFlow::Break(()) => return Err(err),
            },
        }
    }
}

/// Connects a plain (unauthenticated) sender to `addr` and immediately
/// drives the key-exchange handshake, producing an encrypted sender.
pub async fn connect<T: Transport>(
    transport: T,
    addr: ServerAddr,
    policy: &dyn ReconnectionPolicy,
) -> Result<Sender<T, mtp::Encrypted>, AuthorizationError> {
    let sender = Sender::connect(transport, mtp::Plain::new(), addr, policy).await?;
    generate_auth_key(sender).await
}

/// Connects directly with a previously-persisted authorization key,
/// skipping the handshake entirely.
pub async fn connect_with_auth<T: Transport>(
    transport: T,
    addr: ServerAddr,
    auth_key: [u8; 256],
    policy: &dyn ReconnectionPolicy,
) -> Result<Sender<T, mtp::Encrypted>, io::Error> {
    Sender::connect(transport, mtp::Encrypted::build().finish(auth_key), addr, policy).await
}

/// Runs the three-step Diffie-Hellman handshake over `sender` and rebuilds
/// it into an encrypted sender reusing the same connection, transport and
/// buffers.
pub async fn generate_auth_key<T: Transport>(
    mut sender: Sender<T, mtp::Plain>,
) -> Result<Sender<T, mtp::Encrypted>, AuthorizationError> {
    info!("generating a new authorization key...");
    let (request, data) = authentication::step1()?;
    debug!("auth key exchange: sending step 1");
    let response = sender.invoke_raw(request).await?;

    let (request, data) = authentication::step2(data, &response)?;
    debug!("auth key exchange: sending step 2");
    let response = sender.invoke_raw(request).await?;

    let (request, data) = authentication::step3(data, &response)?;
    debug!("auth key exchange: sending step 3");
    let response = sender.invoke_raw(request).await?;

    let authentication::Finished {
        auth_key,
        time_offset,
        first_salt,
    } = authentication::create_key(data, &response)?;
    info!("authorization key generated successfully");

    Ok(Sender {
        stream: sender.stream,
        transport: sender.transport,
        mtp: mtp::Encrypted::build()
            .time_offset(time_offset)
            .first_salt(first_salt)
            .finish(auth_key),
        addr: sender.addr,
        requests: sender.requests,
        next_ping: Instant::now() + PING_DELAY,
        read_buffer: sender.read_buffer,
        read_tail: sender.read_tail,
        write_buffer: sender.write_buffer,
        write_head: sender.write_head,
    })
}
