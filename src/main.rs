use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use sstlog_lib::adif::bands::classify;
use sstlog_lib::commands::{adif, cw, dupe, qso, score, session, settings};
use sstlog_lib::commands::{AppState, StatePaths};
use sstlog_lib::Result;

#[derive(Parser)]
#[command(name = "sstlog", version, about = "K1USN Slow Speed Test contest logger")]
struct Cli {
    /// Contest log database
    #[arg(long, env = "SSTLOG_DB", global = true)]
    db: Option<PathBuf>,

    /// Settings file (default ~/.sstlog.json)
    #[arg(long, env = "SSTLOG_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive logging session (default)
    Run,
    /// Log one contact
    Log {
        call: String,
        name: String,
        qualifier: String,
        /// Band to log on instead of the default
        #[arg(long)]
        band: Option<String>,
        /// Frequency in Hz; the band is derived from it
        #[arg(long)]
        freq: Option<String>,
    },
    /// Check a callsign for a dupe
    Check {
        call: String,
        #[arg(long)]
        band: Option<String>,
    },
    /// Show the log, newest first
    List,
    /// Correct a logged contact
    Edit {
        id: i64,
        call: String,
        /// "NAME QUALIFIER"
        exchange: String,
        /// "YYYY-MM-DD HH:MM:SS"
        date_time: String,
        band: String,
    },
    /// Delete a logged contact
    Delete { id: i64 },
    /// Show the score and write the score report
    Score,
    /// Write the score report and the ADIF export
    Export,
    /// Show the band a frequency (Hz) falls in
    Band { freq: String },
    /// Set your callsign
    Mycall { call: String },
    /// Set your exchange
    Myexchange {
        #[arg(num_args = 1.., required = true)]
        exchange: Vec<String>,
    },
    /// Send a CW macro
    Send {
        fkey: String,
        #[arg(long, default_value = "")]
        call: String,
        #[arg(long, default_value = "")]
        exchange: String,
    },
}

fn init_logging() {
    // A file named `debug` in the working directory turns on info logging
    let default_filter = if Path::new("debug").exists() {
        "sstlog=info,sstlog_lib=info"
    } else {
        "sstlog=warn,sstlog_lib=warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Command::Run);

    // Classification needs no state at all
    if let Command::Band { freq } = &command {
        println!("{}", classify(freq));
        return Ok(());
    }

    let mut state = AppState::open(StatePaths::standard(cli.db, cli.settings)).await?;
    let stats = settings::db_stats(&state).await?;
    log::info!(
        "Log opened: {} contacts on {} bands",
        stats.contact_count,
        stats.band_count
    );

    match command {
        Command::Run => session::run(state).await?,
        Command::Log {
            call,
            name,
            qualifier,
            band,
            freq,
        } => {
            if let Some(band) = band {
                state.band.change_band(&band)?;
            }
            if let Some(freq) = freq {
                state.band.apply_reading(&freq)?;
            }
            match qso::log_contact(&mut state, &call, &format!("{} {}", name, qualifier)).await? {
                Some(id) => {
                    let contact = sstlog_lib::db::qso::get(&state.db, id).await?;
                    println!("{}", qso::format_contact(&contact));
                }
                None => println!("Not logged: need a callsign, a name and a qualifier"),
            }
        }
        Command::Check { call, band } => {
            if let Some(band) = band {
                state.band.change_band(&band)?;
            }
            let check = dupe::check_dupe(&state, &call, "").await;
            println!("{}", serde_json::to_string_pretty(&check)?);
        }
        Command::List => {
            for line in qso::log_lines(&state).await? {
                println!("{}", line);
            }
        }
        Command::Edit {
            id,
            call,
            exchange,
            date_time,
            band,
        } => {
            qso::edit_contact(&state, id, &call, &exchange, &date_time, &band).await?;
            let contact = sstlog_lib::db::qso::get(&state.db, id).await?;
            println!("{}", qso::format_contact(&contact));
        }
        Command::Delete { id } => {
            qso::delete_contact(&state, id).await?;
            println!("Deleted {:03}", id);
        }
        Command::Score => {
            let score = score::write_report(&state).await?;
            print!("{}", score.report());
        }
        Command::Export => println!("{}", adif::generate_logs(&state).await?),
        Command::Mycall { call } => {
            println!("{}", settings::change_my_call(&mut state, &call)?);
        }
        Command::Myexchange { exchange } => {
            println!("{}", settings::change_my_exchange(&mut state, &exchange.join(" "))?);
        }
        Command::Send {
            fkey,
            call,
            exchange,
        } => {
            let text = cw::send_macro(&state, &fkey, &call, &exchange).await?;
            println!("{}", text);
        }
        Command::Band { .. } => {}
    }

    Ok(())
}
