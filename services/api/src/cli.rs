use crate::predict::{run_model_status, run_predict, ModelStatusArgs, PredictArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_approval::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Approval",
    about = "Score loan applications against the trained model and the lending policy",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service and intake form (default command)
    Serve(ServeArgs),
    /// Evaluate a single applicant from the command line
    Predict(PredictArgs),
    /// Inspect the model artifact
    Model {
        #[command(subcommand)]
        command: ModelCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ModelCommand {
    /// Report whether the artifact loads and which model it holds
    Status(ModelStatusArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Predict(args) => run_predict(args),
        Command::Model {
            command: ModelCommand::Status(args),
        } => run_model_status(args),
    }
}
