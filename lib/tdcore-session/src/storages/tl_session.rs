// Copyright 2020 - developers of the `tdcore` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A [`Session`] backed by the small TL schema generated in [`crate::generated`],
//! optionally persisted to a file.

use crate::generated::{enums, types};
use crate::session::{DcOption, Session, UpdateState};
use tdcore_tl_types::errors::DeserializeError;
use tdcore_tl_types::{Deserializable, Serializable};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddrV4, SocketAddrV6};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A [`Session`] implementation that keeps its state in memory, encoded with
/// the schema from [`crate::generated`], and optionally mirrors it to a file
/// on every [`Session::save`].
#[cfg_attr(
    feature = "impl-serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct TlSession {
    session: Mutex<types::Session>,
    #[cfg_attr(feature = "impl-serde", serde(skip))]
    path: Option<PathBuf>,
}

#[allow(clippy::new_without_default)]
impl TlSession {
    /// Creates a fresh, empty, in-memory-only session.
    pub fn new() -> Self {
        Self {
            session: Mutex::new(types::Session {
                dcs: Vec::new(),
                user: None,
                state: None,
            }),
            path: None,
        }
    }

    /// Loads a previous session instance from a file, creating one if it
    /// doesn't exist. Every subsequent [`Session::save`] writes back to
    /// `path`.
    pub fn load_file_or_create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            File::create(path)?;
            let session = TlSession::new().with_path(path);
            Session::save(&session)?;
            Ok(session)
        } else {
            Self::load_file(path)
        }
    }

    /// Loads a previous session instance from a file. Every subsequent
    /// [`Session::save`] writes back to `path`.
    pub fn load_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut data = Vec::new();
        File::open(path.as_ref())?.read_to_end(&mut data)?;

        Self::load(&data)
            .map(|session| session.with_path(path.as_ref()))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Deserializes a session previously produced by [`Self::to_bytes`].
    pub fn load(data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            session: Mutex::new(
                enums::Session::from_bytes(data)
                    .map_err(|e| match e {
                        DeserializeError::UnexpectedEof => Error::MalformedData,
                        DeserializeError::UnexpectedConstructor { .. } => Error::UnsupportedVersion,
                    })?
                    .into(),
            ),
            path: None,
        })
    }

    fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }

    /// Encodes the current state using the schema from [`crate::generated`].
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        enums::Session::Session(self.session.lock().unwrap().clone()).to_bytes()
    }

    /// Writes the encoded session to `path`, truncating whatever was there.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.as_ref())?;
        file.seek(io::SeekFrom::Start(0))?;
        file.write_all(&self.to_bytes())?;
        file.sync_data()
    }
}

fn generated_dc_id(dc: &enums::DataCenter) -> i32 {
    match dc {
        enums::DataCenter::Center(types::DataCenter { id, .. }) => *id,
        enums::DataCenter::Ws(types::DataCenterWs { id, .. }) => *id,
    }
}

impl Session for TlSession {
    fn dc_option(&self, dc_id: i32) -> Option<DcOption> {
        self.session
            .lock()
            .unwrap()
            .dcs
            .iter()
            .find(|dc| generated_dc_id(dc) == dc_id)
            .map(dc_option_from_generated)
    }

    fn set_dc_option(&self, dc_option: &DcOption) {
        let mut session = self.session.lock().unwrap();
        let new_dc = dc_option_to_generated(dc_option);
        if let Some(pos) = session
            .dcs
            .iter()
            .position(|dc| generated_dc_id(dc) == generated_dc_id(&new_dc))
        {
            session.dcs[pos] = new_dc;
        } else {
            session.dcs.push(new_dc);
        }
    }

    fn user_dc(&self) -> Option<i32> {
        let session = self.session.lock().unwrap();
        let enums::User::User(user) = session.user.as_ref()?;
        Some(user.dc)
    }

    fn set_user_dc(&self, dc_id: i32) {
        let mut session = self.session.lock().unwrap();
        let id = match &session.user {
            Some(enums::User::User(user)) => user.id,
            None => 0,
        };
        let bot = match &session.user {
            Some(enums::User::User(user)) => user.bot,
            None => false,
        };
        session.user = Some(enums::User::User(types::User { id, dc: dc_id, bot }));
    }

    fn update_state(&self) -> Option<UpdateState> {
        let session = self.session.lock().unwrap();
        let enums::UpdateState::State(state) = session.state.clone()?;
        Some(UpdateState {
            pts: state.pts,
            qts: state.qts,
            date: state.date,
            seq: state.seq,
            channels: state.channels,
        })
    }

    fn set_update_state(&self, state: UpdateState) {
        self.session.lock().unwrap().state = Some(enums::UpdateState::State(types::UpdateState {
            pts: state.pts,
            qts: state.qts,
            date: state.date,
            seq: state.seq,
            channels: state.channels,
        }));
    }

    fn save(&self) -> io::Result<()> {
        match &self.path {
            Some(path) => self.save_to_file(path),
            None => Ok(()),
        }
    }
}

fn dc_option_from_generated(dc: &enums::DataCenter) -> DcOption {
    match dc {
        enums::DataCenter::Center(types::DataCenter {
            id,
            ipv4,
            ipv6,
            port,
            auth,
        }) => DcOption {
            id: *id,
            ipv4: SocketAddrV4::new(
                ipv4.map(|v| Ipv4Addr::from(v.to_le_bytes()))
                    .unwrap_or(Ipv4Addr::UNSPECIFIED),
                *port as u16,
            ),
            ipv6: SocketAddrV6::new(
                ipv6.map(|v| Ipv6Addr::from(v.to_le_bytes()))
                    .unwrap_or(Ipv6Addr::UNSPECIFIED),
                *port as u16,
                0,
                0,
            ),
            auth_key: auth.as_ref().and_then(|a| a.clone().try_into().ok()),
        },
        enums::DataCenter::Ws(types::DataCenterWs { id, auth, .. }) => DcOption {
            id: *id,
            ipv4: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
            ipv6: SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, 0, 0, 0),
            auth_key: auth.as_ref().and_then(|a| a.clone().try_into().ok()),
        },
    }
}

fn dc_option_to_generated(dc: &DcOption) -> enums::DataCenter {
    let ipv4 = if dc.ipv4.ip().is_unspecified() {
        None
    } else {
        Some(i32::from_le_bytes(dc.ipv4.ip().octets()))
    };
    let ipv6 = if dc.ipv6.ip().is_unspecified() {
        None
    } else {
        Some(i128::from_le_bytes(dc.ipv6.ip().octets()))
    };
    let port = if dc.ipv4.port() != 0 {
        dc.ipv4.port()
    } else {
        dc.ipv6.port()
    };

    enums::DataCenter::Center(types::DataCenter {
        id: dc.id,
        ipv4,
        ipv6,
        port: port as i32,
        auth: dc.auth_key.map(|k| k.to_vec()),
    })
}

#[derive(Debug)]
pub enum Error {
    MalformedData,
    UnsupportedVersion,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedData => write!(f, "malformed data"),
            Error::UnsupportedVersion => write!(f, "unsupported version"),
        }
    }
}

impl std::error::Error for Error {}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, error.to_string())
    }
}
