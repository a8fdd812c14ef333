use barrest_app::{
    database,
    passwords::{DEFAULT_COST, hash_password},
    staff::{PgStaffRepository, StaffRepository, data::NewStaff, records::StaffUuid},
};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct CreateStaffArgs {
    /// Login name
    #[arg(long)]
    username: String,

    /// Initial password
    #[arg(long, env = "STAFF_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// Staff role, e.g. `manager`, `bartender`, `waiter`
    #[arg(long)]
    role: String,

    #[arg(long)]
    email: Option<String>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateStaffArgs) -> Result<(), String> {
    if args.username.trim().is_empty() {
        return Err("username cannot be empty".to_string());
    }

    if args.password.is_empty() {
        return Err("password cannot be empty".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let password_hash = hash_password(&args.password, DEFAULT_COST)
        .await
        .map_err(|error| format!("failed to hash password: {error}"))?;

    let staff = PgStaffRepository::new(pool)
        .create_staff(NewStaff {
            uuid: StaffUuid::new(),
            username: args.username,
            email: args.email,
            password_hash,
            first_name: args.first_name,
            last_name: args.last_name,
            role: args.role,
        })
        .await
        .map_err(|error| format!("failed to create staff member: {error}"))?;

    #[expect(clippy::print_stdout, reason = "CLI output")]
    {
        println!("staff_id: {}", staff.uuid);
        println!("username: {}", staff.username);
        println!("role: {}", staff.role);
    }

    Ok(())
}
