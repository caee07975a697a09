pub mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "moe_cap")]
#[command(about = "Bandwidth and latency estimates for MoE inference deployments", long_about = None)]
struct Cli {
    /// JSON config file with query and supply defaults
    #[arg(long, global = true)]
    config: Option<String>,
    /// Replace the bundled model data file
    #[arg(long, global = true)]
    models_file: Option<String>,
    /// Replace the bundled hardware data file
    #[arg(long, global = true)]
    hardware_file: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

/// Query options shared by the estimate commands
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Model id or display name
    #[arg(long)]
    pub model: Option<String>,
    /// Decode batch size
    #[arg(long)]
    pub batch_size: Option<u32>,
    /// Context scenario (5k or 14k)
    #[arg(long)]
    pub scenario: Option<String>,
    /// Target time per output token in ms
    #[arg(long)]
    pub slo_ms: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the models in the registry
    Models,
    /// Required bandwidth for one query
    Demand {
        #[command(flatten)]
        query: QueryArgs,
        /// Also classify this device
        #[arg(long)]
        device: Option<String>,
    },
    /// Dense baseline and the batch size that matches it
    Dense {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Compare every device against the demand
    Devices {
        #[command(flatten)]
        query: QueryArgs,
        /// Only list devices whose peak bandwidth covers the demand
        #[arg(long)]
        only_sufficient: bool,
        /// Save rows to a JSON file
        #[arg(long)]
        output: Option<String>,
    },
    /// Time to first token
    Ttft {
        /// Model id (all models when omitted)
        #[arg(long)]
        model: Option<String>,
        /// Sweep input lengths on one device
        #[arg(long)]
        device: Option<String>,
        /// Prompt length in tokens
        #[arg(long)]
        input_len: Option<u32>,
        #[arg(long, default_value = "1")]
        batch_size: u32,
    },
    /// Demand over batch sizes 1..256 next to achievable supply
    Sweep {
        #[command(flatten)]
        query: QueryArgs,
        /// Device whose peak bandwidth sets the supply
        #[arg(long)]
        device: Option<String>,
        #[arg(long)]
        device_count: Option<u32>,
        /// Sustained memory bandwidth utilisation, percent
        #[arg(long)]
        smbu: Option<f64>,
        /// Save rows to a JSON file
        #[arg(long)]
        output: Option<String>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let session = commands::Session::open(cli.config, cli.models_file, cli.hardware_file)?;

    match cli.command {
        Commands::Models => commands::models(&session),
        Commands::Demand { query, device } => commands::demand(&session, query, device),
        Commands::Dense { query } => commands::dense(&session, query),
        Commands::Devices {
            query,
            only_sufficient,
            output,
        } => commands::devices(&session, query, only_sufficient, output),
        Commands::Ttft {
            model,
            device,
            input_len,
            batch_size,
        } => commands::ttft(&session, model, device, input_len, batch_size),
        Commands::Sweep {
            query,
            device,
            device_count,
            smbu,
            output,
        } => commands::sweep(&session, query, device, device_count, smbu, output),
    }
}
