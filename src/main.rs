use anyhow::{bail, Context};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use postmail::config::Config;
use postmail::mail::Mailer;
use postmail::transport::{Delivery, Transport};

const USAGE: &str = "usage: postmail <to> <subject> [view] < body";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(to), Some(subject)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };
    let view = args.next();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        endpoint = %config.postmark.endpoint,
        view_path = %config.views.view_path.display(),
        "Configuration loaded"
    );

    let mut body = String::new();
    tokio::io::stdin()
        .read_to_string(&mut body)
        .await
        .context("Failed to read body from stdin")?;

    let mut mailer = Mailer::from_config(&config);
    let mut mail = mailer.compose();
    mail.set_subject(subject).add_to(to);
    if let Some(view) = view {
        mail.set_view(view);
    }
    mail.set_body(body, None, None)?;

    match mailer.send(&mail).await? {
        Delivery::Sent(receipt) => {
            tracing::info!(message_id = %receipt.message_id, "Message sent");
            println!("{}", receipt.message_id);
        }
        Delivery::Cancelled => tracing::warn!("Send cancelled"),
    }

    mailer.transport_mut().stop();

    Ok(())
}
