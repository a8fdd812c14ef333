use barrest_app::{
    database,
    staff::{PgStaffRepository, StaffRepository},
};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct DeactivateStaffArgs {
    /// Login name
    #[arg(long)]
    username: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: DeactivateStaffArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let found = PgStaffRepository::new(pool)
        .set_active(&args.username, false)
        .await
        .map_err(|error| format!("failed to deactivate staff member: {error}"))?;

    if !found {
        return Err(format!("no staff member named '{}'", args.username));
    }

    #[expect(clippy::print_stdout, reason = "CLI output")]
    {
        println!("deactivated: {}", args.username);
    }

    Ok(())
}
