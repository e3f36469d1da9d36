use crate::demo::{run_contact_validate, run_demo, ContactValidateArgs, DemoArgs};
use crate::server;
use brokerage_site::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Brokerage Site Service",
    about = "Serve and exercise the brokerage site's contact form and route guard",
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
    /// Work with contact requests from the command line
    Contact {
        #[command(subcommand)]
        command: ContactCommand,
    },
    /// Walk one contact form through its whole submission lifecycle
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ContactCommand {
    /// Validate a contact request and print any field errors
    Validate(ContactValidateArgs),
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
        Command::Contact {
            command: ContactCommand::Validate(args),
        } => {
            if run_contact_validate(args)? {
                Ok(())
            } else {
                std::process::exit(2);
            }
        }
        Command::Demo(args) => run_demo(args).await,
    }
}
