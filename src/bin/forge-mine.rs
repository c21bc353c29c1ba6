#![forbid(unsafe_code)]
use std::time::Instant;

use clap::Parser;
use rand::Rng;

use forgechain::ledger::{Ledger, MineOutcome};

#[derive(Parser)]
#[command(author, version, about = "Mine blocks of generated payloads", long_about = None)]
struct Cli {
    /// Leading zero hex characters required of every block hash
    #[arg(long, default_value_t = 5)]
    difficulty: u32,

    /// Payloads generated per block
    #[arg(long, default_value_t = 5)]
    count: usize,

    /// Number of blocks to mine
    #[arg(long, default_value_t = 1)]
    rounds: usize,
}

fn random_payload(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    let ledger = Ledger::new(cli.difficulty)?;

    for _ in 0..cli.rounds {
        for _ in 0..cli.count {
            ledger.submit_transaction(random_payload(10));
        }

        let started = Instant::now();
        match ledger.mine()? {
            MineOutcome::Sealed(block) => {
                println!(
                    "\n⛏️  Block #{} sealed in {:.3}s",
                    block.index,
                    started.elapsed().as_secs_f64()
                );
                println!("    hash:      {}", block.hash);
                println!("    previous:  {}", block.previous_hash);
                println!("    nonce:     {}", block.nonce);
                println!("    payloads:  {}", block.transactions.len());
            }
            MineOutcome::EmptyPool => println!("Nothing to mine"),
            MineOutcome::Cancelled => println!("Search cancelled"),
        }
    }

    Ok(())
}
