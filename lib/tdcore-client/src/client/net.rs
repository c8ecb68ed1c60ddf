// Copyright 2020 - developers of the `tdcore` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Methods directly related to the network on the [`Client`].

use super::{Client, ClientInner, Config, Request, Step};
use crate::utils::Mutex;
use futures::future::FutureExt as _;
use futures::{future, pin_mut};
use tdcore_mtproto::{mtp, transport};
use tdcore_mtsender::{self as sender, AuthorizationError, InvocationError, ServerAddr, Sender};
use tdcore_session::{ChatHashCache, MessageBoxes, DEFAULT_DC, KNOWN_DC_OPTIONS};
use tdcore_tl_types as tl;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

/// Figure out the address to dial for a given datacenter, preferring whatever the session
/// already knows about it, then the user-supplied override, then the hardcoded bootstrap list.
fn resolve_addr(dc_id: i32, config: &Config) -> (ServerAddr, Option<[u8; 256]>) {
    if let Some(addr) = config.params.server_addr {
        let auth_key = config.session.dc_option(dc_id).and_then(|dc| dc.auth_key);
        return (ServerAddr::Tcp { address: addr }, auth_key);
    }

    if let Some(dc) = config.session.dc_option(dc_id) {
        return (
            ServerAddr::Tcp {
                address: SocketAddr::V4(dc.ipv4),
            },
            dc.auth_key,
        );
    }

    let dc = KNOWN_DC_OPTIONS
        .iter()
        .find(|dc| dc.id == dc_id)
        .unwrap_or(&KNOWN_DC_OPTIONS[(DEFAULT_DC - 1) as usize]);

    (
        ServerAddr::Tcp {
            address: SocketAddr::V4(dc.ipv4),
        },
        None,
    )
}

pub(crate) async fn connect_sender(
    dc_id: i32,
    config: &Config,
) -> Result<Sender<transport::Full, mtp::Encrypted>, AuthorizationError> {
    let transport = transport::Full::new();
    let (addr, auth_key) = resolve_addr(dc_id, config);
    let policy = config.params.reconnection_policy.as_ref();

    let mut sender = if let Some(auth_key) = auth_key {
        info!(
            "creating a new sender with existing auth key to dc {} {:?}",
            dc_id, addr
        );
        sender::connect_with_auth(transport, addr, auth_key, policy).await?
    } else {
        info!(
            "creating a new sender and auth key in dc {} {:?}",
            dc_id, addr
        );
        let sender = sender::connect(transport, addr, policy).await?;

        config.session.set_dc_option(&tdcore_session::DcOption {
            id: dc_id,
            auth_key: Some(sender.auth_key()),
            ..config
                .session
                .dc_option(dc_id)
                .unwrap_or(KNOWN_DC_OPTIONS[(DEFAULT_DC - 1) as usize])
        });
        config.session.save()?;
        sender
    };

    // TODO handle -404 (we had a previously-valid authkey, but server no longer knows about it)
    // TODO all up-to-date server addresses should be stored in the session for future initial connections
    let _remote_config = sender
        .invoke(&tl::functions::InvokeWithLayer {
            layer: tl::LAYER,
            query: tl::functions::InitConnection {
                api_id: config.api_id,
                device_model: config.params.device_model.clone(),
                system_version: config.params.system_version.clone(),
                app_version: config.params.app_version.clone(),
                system_lang_code: config.params.system_lang_code.clone(),
                lang_pack: "".into(),
                lang_code: config.params.lang_code.clone(),
                proxy: None,
                params: None,
                query: tl::functions::help::GetConfig {},
            },
        })
        .await?;

    config.session.set_user_dc(dc_id);
    config.session.save()?;

    Ok(sender)
}

impl Client {
    /// Creates and returns a new client instance upon successful connection to Telegram.
    ///
    /// If the session in the configuration did not have an authorization key, a new one
    /// will be created and the session will be saved with it.
    ///
    /// The connection will be initialized with the data from the input configuration.
    pub async fn connect(config: Config) -> Result<Self, AuthorizationError> {
        let dc_id = config.session.user_dc().unwrap_or(DEFAULT_DC);
        let sender = connect_sender(dc_id, &config).await?;

        let message_box = match config.session.update_state() {
            Some(state) if config.params.catch_up => MessageBoxes::load(state),
            _ => MessageBoxes::new(),
        };

        // TODO Sender doesn't have a way to handle backpressure yet
        let (handle_tx, handle_rx) = mpsc::unbounded_channel();
        Ok(Self(Arc::new(ClientInner {
            id: rand_id(),
            sender: AsyncMutex::new(sender),
            dc_id: Mutex::new(dc_id),
            config,
            handle_tx,
            handle_rx: AsyncMutex::new(handle_rx),
            message_box: Mutex::new(message_box),
            chat_hashes: Mutex::new(ChatHashCache::new(None)),
            updates: Mutex::new(Default::default()),
            last_update_limit_warn: Mutex::new(None),
        })))
    }

    /// Invoke a raw API call without the need to use `handle` or `step`.
    pub async fn invoke<R: tl::RemoteCall>(
        &self,
        request: &R,
    ) -> Result<R::Return, InvocationError> {
        self.0
            .sender
            .lock()
            .await
            .invoke(request)
            .await
    }

    /// Return a new handle that can be used to invoke remote procedure calls.
    ///
    /// [`ClientHandle`] is the same type as [`Client`], so this simply clones the reference.
    pub fn handle(&self) -> super::ClientHandle {
        self.clone()
    }

    /// Perform a single network step or processing of incoming requests via handles.
    ///
    /// If a server message is received, its updates (if any) are merged into the internal
    /// queue and become available through [`Client::next_update`].
    pub async fn step(&self) -> Result<Step, sender::ReadError> {
        let (network, request) = {
            let mut sender = self.0.sender.lock().await;
            let mut handle_rx = self.0.handle_rx.lock().await;
            let network = sender.step();
            let request = handle_rx.recv();
            pin_mut!(network);
            pin_mut!(request);
            match future::select(network, request).await {
                future::Either::Left((network, request)) => {
                    let request = request.now_or_never();
                    (Some(network), request)
                }
                future::Either::Right((request, network)) => {
                    let network = network.now_or_never();
                    (network, Some(request))
                }
            }
        };

        if let Some(request) = request {
            let request = request.expect("mpsc returned None");
            match request {
                Request::Disconnect { response } => {
                    drop(response.send(()));
                    return Ok(Step::Disconnected);
                }
            }
        }

        if let Some(updates) = network {
            self.process_socket_updates(updates?);
        }

        Ok(Step::Connected)
    }

    /// Run the client by repeatedly `step`ping the client until a graceful disconnection occurs,
    /// or a network error occurs. Incoming updates are enqueued and can be read concurrently
    /// through [`Client::next_update`] from another handle.
    pub async fn run_until_disconnected(self) -> Result<(), sender::ReadError> {
        loop {
            match self.step().await? {
                Step::Connected => continue,
                Step::Disconnected => break Ok(()),
            }
        }
    }

    /// Gracefully tell the `step` loop to disconnect and stop receiving things from the network.
    pub async fn disconnect(&self) {
        let (response, rx) = tokio::sync::oneshot::channel();

        // TODO handle errors and not just drop them
        drop(self.0.handle_tx.send(Request::Disconnect { response }));
        rx.await.unwrap();
    }
}

fn rand_id() -> i64 {
    let mut buffer = [0; 8];
    getrandom::getrandom(&mut buffer).expect("failed to generate client id");
    i64::from_le_bytes(buffer)
}
