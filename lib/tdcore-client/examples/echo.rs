//! Example to echo user text messages. Runnable as:
//!
//! ```sh
//! cargo run --example echo -- API_ID API_HASH BOT_TOKEN
//! ```

use tdcore_client::{AuthorizationError, Client, Config, InvocationError, Update};
use tdcore_session::storages::TlSession;
use log;
use simple_logger;
use std::env;
use tokio::runtime;

async fn handle_update(update: Update) -> Result<(), InvocationError> {
    match update {
        Update::NewMessage(message) if !message.outgoing() => {
            println!("Responding to {:?}", message.chat());
            message.respond(message.text().into()).await?;
        }
        _ => {}
    }

    Ok(())
}

async fn async_main() -> Result<(), AuthorizationError> {
    simple_logger::init_with_level(log::Level::Debug).expect("failed to setup logging");

    let mut args = env::args();

    let _path = args.next();
    let api_id = args
        .next()
        .expect("api_id missing")
        .parse()
        .expect("api_id invalid");
    let api_hash = args.next().expect("api_hash missing");
    let token = args.next().expect("token missing");

    println!("Connecting to Telegram...");
    let client = Client::connect(Config {
        session: Box::new(TlSession::load_file_or_create("echo.session")?),
        api_id,
        api_hash: api_hash.clone(),
        params: Default::default(),
    })
    .await?;
    println!("Connected!");

    if !client.is_authorized().await? {
        println!("Signing in...");
        client.bot_sign_in(&token, api_id, &api_hash).await?;
        println!("Signed in!");
    }

    println!("Waiting for messages...");
    while let Some(update) = client.next_update().await? {
        handle_update(update).await?;
    }

    Ok(())
}

fn main() -> Result<(), AuthorizationError> {
    runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async_main())
}
