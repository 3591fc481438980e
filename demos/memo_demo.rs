use std::thread;
use std::time::Duration;

use clap::Parser;
use log::info;
use memo_rs::memo::Memo;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[derive(Parser, Debug)]
#[command(author, version, about = "Square numbers through a memoizing cache")]
struct Cli {
    /// Numbers to square; repeats are served from the cache.
    #[arg(required = true)]
    numbers: Vec<i64>,

    /// Simulated cost of one computation, in milliseconds.
    #[arg(long, default_value_t = 100)]
    cost_ms: u64,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    TermLogger::init(
        if args.verbose { LevelFilter::Debug } else { LevelFilter::Info },
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let cost = Duration::from_millis(args.cost_ms);
    let square = Memo::new(|n: &i64| {
        info!("Calculating {}^2...", n);
        thread::sleep(cost);
        n * n
    });

    for &n in &args.numbers {
        let res = square.call(n)?;
        println!("{}^2 = {}", n, res);
    }

    println!("{}", square.stats());

    Ok(())
}
