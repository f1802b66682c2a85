use clap::Parser;
use log::info;
use matrix_calc::{Config, DisplayMode, Session};

use std::io;

/// An RPN calculator for exact fractions and matrices
#[derive(Debug, Parser)]
#[command(name = "matcalc", version, about, long_about = None)]
struct Cli {
    /// Show numbers as decimals
    #[arg(long, overrides_with = "fraction")]
    decimal: bool,

    /// Show numbers as fractions (the default)
    #[arg(long, overrides_with = "decimal")]
    fraction: bool,

    /// Don't print prompts when asking for input
    #[arg(long, overrides_with = "prompt")]
    no_prompt: bool,

    /// Print prompts when asking for input (the default)
    #[arg(long, overrides_with = "no_prompt")]
    prompt: bool,

    /// Open the help screen before starting
    #[arg(long)]
    help_screen: bool
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            display: if self.decimal && !self.fraction {
                DisplayMode::Decimal
            } else {
                DisplayMode::Fraction
            },
            prompts: self.prompt || !self.no_prompt
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.config();
    info!("starting with {:?}", config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(stdin.lock(), stdout.lock(), config);

    if cli.help_screen && !session.help_screen()? {
        return Ok(());
    }
    session.run()?;
    Ok(())
}
