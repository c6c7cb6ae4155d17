use crate::demo::{
    run_demo, run_explain, run_rank, run_simulate, ExplainArgs, RankArgs, SimulateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use var_insight::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "VAR Insight",
    about = "Score, rank, explain and simulate VAR acquisition targets",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank a roster under the default acquisition criteria
    Rank(RankArgs),
    /// Print the score breakdown and reasoning for one candidate
    Explain(ExplainArgs),
    /// Project combined financials for a set of targets
    Simulate(SimulateArgs),
    /// Walk through ranking, explanation and a scenario on the bundled sample roster
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rank(args) => run_rank(args),
        Command::Explain(args) => run_explain(args).await,
        Command::Simulate(args) => run_simulate(args),
        Command::Demo => run_demo().await,
    }
}
