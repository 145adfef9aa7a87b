use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flight_booking_client::{
    config::Config,
    console::{self, render, Command, Flow},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to read configuration")?;

    // Логи в stderr, чтобы не мешать выводу консоли
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting flight booking client ({}) against {}",
        config.app.environment, config.store.base_url
    );

    let state = AppState::new(config).context("Failed to create booking store client")?;
    let session = &state.session;

    // Initial load; failures are already on the error notification
    if session.refresh().await.is_err() {
        warn!("Initial load incomplete, use `refresh` to retry");
    }

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut screen = render::seat_view(session);
    let notices = render::notifications(&session.notifications());
    if !notices.is_empty() {
        screen.push('\n');
        screen.push_str(&notices);
    }

    loop {
        stdout
            .write_all(format!("{}\n> ", screen).as_bytes())
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            screen.clear();
            continue;
        }

        screen = match line.parse::<Command>() {
            Ok(command) => match console::execute(session, command).await {
                Flow::Continue(output) => output,
                Flow::Quit => break,
            },
            Err(e) => e.to_string(),
        };
    }

    info!("Bye");
    Ok(())
}
