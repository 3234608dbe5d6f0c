use airhub_client::{ControllerClient, ControllerEvent};
use airhub_net::CONTROLLER_PORT;
use clap::{Parser, ValueEnum};
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PowerArg {
    On,
    Off,
}

#[derive(Parser, Debug)]
#[command(name = "airhub-zonectl")]
struct Args {
    /// Controller address.
    #[arg(long)]
    ip: IpAddr,
    #[arg(long, default_value_t = CONTROLLER_PORT)]
    port: u16,
    /// Zone number, 0-15.
    #[arg(long)]
    zone: u8,
    #[arg(long, value_enum)]
    power: Option<PowerArg>,
    /// Hold the damper at a fixed open percentage, 0-100.
    #[arg(long, conflicts_with = "setpoint")]
    damper: Option<u8>,
    /// Regulate to a target temperature in degrees Celsius, 10.0-35.0.
    #[arg(long)]
    setpoint: Option<f32>,
    /// Seconds to wait for a confirming status push.
    #[arg(long, default_value_t = 10)]
    confirm_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let (client, mut events) = ControllerClient::connect((args.ip, args.port).into());

    if let Some(power) = args.power {
        client.set_zone_power(args.zone, matches!(power, PowerArg::On))?;
    }
    if let Some(percent) = args.damper {
        client.set_zone_damper_percent(args.zone, percent)?;
    }
    if let Some(setpoint) = args.setpoint {
        client.set_zone_setpoint(args.zone, setpoint)?;
    }

    let confirm = async {
        while let Some(event) = events.recv().await {
            if let ControllerEvent::ZoneStatusUpdated(status) = event {
                if status.zone == args.zone {
                    return Some(status);
                }
            }
        }
        None
    };
    match timeout(Duration::from_secs(args.confirm_secs), confirm).await {
        Ok(Some(status)) => println!(
            "zone {}: power={:?} damper={}% target={} current={}",
            status.zone,
            status.power,
            status.damper_percent,
            status.setpoint,
            status.current_temp,
        ),
        Ok(None) => eprintln!("session ended before a status push arrived"),
        Err(_) => eprintln!("no status push within {}s; command may still apply", args.confirm_secs),
    }
    Ok(())
}
