use crate::demo::{run_demo, run_select, DemoArgs, SelectArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fare_currency::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fare Currency Selection",
    about = "Run and demonstrate fare currency selection from the command line",
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
    /// Run a JSON currency selection request and print the result
    Select(SelectArgs),
    /// Walk through São Paulo / London selection scenarios on the built-in tables
    Demo(DemoArgs),
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
        Command::Select(args) => run_select(args),
        Command::Demo(args) => run_demo(args),
    }
}
