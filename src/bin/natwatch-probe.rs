use std::time::{Duration, Instant};
use clap::Parser;

use natwatch::config::SocketKind;
use natwatch::probe::{IcmpProber, Prober};

#[derive(Parser)]
#[command(name = "natwatch-probe")]
#[command(about = "Send ICMP echo requests the way the natwatch monitor does", long_about = None)]
struct Cli {
    /// Hostname or IPv4 address to probe.
    host: String,

    /// Read deadline per attempt in milliseconds.
    #[arg(short, long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Number of attempts.
    #[arg(short, long, default_value_t = 1)]
    count: u32,

    /// Delay between attempts in milliseconds.
    #[arg(short, long, default_value_t = 1000)]
    interval_ms: u64,

    #[arg(short, long, value_enum, default_value_t = SocketKind::Raw)]
    socket: SocketKind,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let prober = IcmpProber::new(cli.socket);
    let timeout = Duration::from_millis(cli.timeout_ms);

    let mut successes = 0;
    for attempt in 1..=cli.count {
        let start = Instant::now();
        match prober.probe(&cli.host, timeout).await {
            Ok(()) => {
                successes += 1;
                println!("{}: reply from {} in {:?}", attempt, cli.host, start.elapsed());
            }
            Err(e) => println!("{}: {}", attempt, e),
        }

        if attempt < cli.count {
            tokio::time::sleep(Duration::from_millis(cli.interval_ms)).await;
        }
    }

    println!("{}/{} replies", successes, cli.count);
    if successes == 0 {
        std::process::exit(1);
    }
    Ok(())
}
