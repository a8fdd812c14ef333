use clap::{Parser, Subcommand};

mod db;
mod staff;

#[derive(Debug, Parser)]
#[command(name = "barrest-app", about = "Barrest administration CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Staff(staff::StaffCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Staff(command) => staff::run(command).await,
        }
    }
}
