use airhub_net::discovery::{discover_on, DISCOVERY_PORT};
use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "airhub-discover")]
struct Args {
    /// How long to collect replies.
    #[arg(long, default_value_t = 5)]
    window_secs: u64,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut replies = discover_on(
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, DISCOVERY_PORT)),
        SocketAddr::from((Ipv4Addr::BROADCAST, DISCOVERY_PORT)),
        Duration::from_secs(args.window_secs),
    )
    .await?;

    let mut count = 0usize;
    while let Some(found) = replies.recv().await {
        count += 1;
        if args.json {
            println!("{}", serde_json::to_string(&found)?);
        } else {
            println!(
                "{}: {} (controller {}, console {})",
                found.addr, found.name, found.controller_id, found.console_id
            );
        }
    }
    if !args.json && count == 0 {
        eprintln!("no controllers answered within {}s", args.window_secs);
    }
    Ok(())
}
