// Copyright 2020 - developers of the `tdcore` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::io;
use std::net::{SocketAddrV4, SocketAddrV6};

use crate::generated::enums::ChannelState as ChannelStateEnum;

/// Everything known about a single datacenter: how to reach it, and the
/// authorization key negotiated with it, if any.
///
/// Both an IPv4 and an IPv6 address are kept side by side so a sender can
/// pick whichever family the host actually has connectivity for.
#[derive(Debug, Clone, Copy)]
pub struct DcOption {
    pub id: i32,
    pub ipv4: SocketAddrV4,
    pub ipv6: SocketAddrV6,
    pub auth_key: Option<[u8; 256]>,
}

/// The update sequencer's durable state: the `pts`/`qts`/`date`/`seq`
/// counters for the account-wide box, plus one entry per channel that has
/// its own independent `pts`.
///
/// This is what [`crate::MessageBoxes::load`] consumes and
/// [`crate::MessageBoxes::session_state`] produces, so that a session can be
/// torn down and resumed later without losing track of which updates have
/// already been seen.
#[derive(Debug, Clone)]
pub struct UpdateState {
    pub pts: i32,
    pub qts: i32,
    pub date: i32,
    pub seq: i32,
    pub channels: Vec<ChannelStateEnum>,
}

/// The trait used by session implementations.
///
/// The creation and loading of sessions is left up to each concrete
/// implementation, since they may choose different ways of being loaded.
/// However, all of them should store the required information to allow
/// saving themselves whenever the client requests to do so.
///
/// Unlike the per-request logic above it, a session is shared across every
/// connection a client holds open (one per datacenter it talks to), so its
/// methods take `&self` and are expected to guard their state internally.
pub trait Session: Send + Sync {
    /// Look up what's known about a datacenter, if anything.
    fn dc_option(&self, dc_id: i32) -> Option<DcOption>;

    /// Record (or update) what's known about a datacenter.
    fn set_dc_option(&self, dc_option: &DcOption);

    /// Return the datacenter the current user is signed in to, if any.
    fn user_dc(&self) -> Option<i32>;

    /// Record which datacenter the current user signed in to.
    fn set_user_dc(&self, dc_id: i32);

    /// Load the update sequencer's last known state, if the session has
    /// ever persisted one.
    fn update_state(&self) -> Option<UpdateState>;

    /// Persist the update sequencer's state.
    fn set_update_state(&self, state: UpdateState);

    /// Persist the data to disk (or whatever backing store is in use).
    fn save(&self) -> io::Result<()>;
}
