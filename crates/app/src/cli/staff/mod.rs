use clap::{Args, Subcommand};

mod create;
mod deactivate;

#[derive(Debug, Args)]
pub(crate) struct StaffCommand {
    #[command(subcommand)]
    command: StaffSubcommand,
}

#[derive(Debug, Subcommand)]
enum StaffSubcommand {
    Create(create::CreateStaffArgs),
    Deactivate(deactivate::DeactivateStaffArgs),
}

pub(crate) async fn run(command: StaffCommand) -> Result<(), String> {
    match command.command {
        StaffSubcommand::Create(args) => create::run(args).await,
        StaffSubcommand::Deactivate(args) => deactivate::run(args).await,
    }
}
