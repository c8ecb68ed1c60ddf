//! This example fetches all dialogs and prints them to the console.
//!
//! ```sh
//! cargo run --example print_dialogs -- API_ID API_HASH
//! ```

use std::env;
use std::io::{self, Write};

use tdcore_client::{AuthorizationError, Client, Config};
use tdcore_session::storages::TlSession;
use tokio::runtime;

const SESSION_FILE: &str = "dialogs.session";

fn ask_input(message: &str) -> Result<String, AuthorizationError> {
    let mut input = String::new();
    print!("{}", message);
    io::stdout().flush()?;
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

async fn async_main() -> Result<(), AuthorizationError> {
    let mut args = env::args();

    let _path = args.next();
    let api_id = args
        .next()
        .expect("api_id missing")
        .parse()
        .expect("api_id invalid");
    let api_hash = args.next().expect("api_hash missing");

    println!("Connecting to Telegram...");
    let client = Client::connect(Config {
        session: Box::new(TlSession::load_file_or_create(SESSION_FILE)?),
        api_id,
        api_hash: api_hash.clone(),
        params: Default::default(),
    })
    .await?;
    println!("Connected!");

    if !client.is_authorized().await? {
        let phone = ask_input("Enter your phone (international format): ")?;
        let token = client.request_login_code(&phone, api_id, &api_hash).await?;

        let code = ask_input("Enter the code you received: ")?;
        client.sign_in(&token, code.trim()).await.expect("failed to login");
        client.session().save()?;
    }

    let mut dialogs = client.iter_dialogs();
    while let Some(dialog) = dialogs.next().await? {
        let chat = dialog.chat();
        println!("[{:>10}] {}", chat.id(), chat.name().unwrap_or(""));
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
