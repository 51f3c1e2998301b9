//! Create a staff identity, i.e. an account with no patient or doctor profile.
//!
//! The password is read from the first line of standard input so it never
//! appears in the process list.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use mockable::DefaultClock;
use tokio::runtime::Builder;
use zeroize::Zeroizing;

use clinic::domain::RegistrationService;
use clinic::domain::ports::AccountFields;
use clinic::outbound::persistence::{DbPool, DieselIdentityRepository, PoolConfig};
use clinic::outbound::security::Argon2Hasher;

/// `create-staff` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-staff",
    about = "Create a staff account; the password is read from stdin",
    version
)]
struct CliArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long = "first-name")]
    first_name: String,
    #[arg(long = "last-name")]
    last_name: String,
    /// Database connection URL. Falls back to `CLINIC_DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url)?;
    let password = read_password()?;

    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let service = RegistrationService::new(
        Arc::new(DieselIdentityRepository::new(pool)),
        Arc::new(Argon2Hasher::new()),
        Arc::new(DefaultClock),
    );

    let account = AccountFields {
        username: Some(args.username),
        first_name: Some(args.first_name),
        last_name: Some(args.last_name),
        email: Some(args.email),
        confirm_password: Some(password.clone()),
        password: Some(password),
    };
    let id = service
        .register_staff(account)
        .await
        .map_err(|error| io::Error::other(describe(&error)))?;

    writeln!(io::stdout().lock(), "created staff identity {id}")
}

fn resolve_database_url(arg: Option<String>) -> io::Result<String> {
    arg.or_else(|| std::env::var("CLINIC_DATABASE_URL").ok())
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "pass --database-url or set CLINIC_DATABASE_URL",
            )
        })
}

fn read_password() -> io::Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "expected a password on stdin",
        ));
    }
    Ok(Zeroizing::new(trimmed.to_owned()))
}

/// Render field errors on one line each so the operator sees every problem.
fn describe(error: &clinic::domain::Error) -> String {
    let fields = error
        .details()
        .and_then(|details| details.get("fields"))
        .and_then(|fields| fields.as_array());
    let Some(fields) = fields else {
        return error.to_string();
    };
    fields
        .iter()
        .map(|field| {
            format!(
                "{}: {}",
                field.get("field").and_then(|v| v.as_str()).unwrap_or("?"),
                field.get("message").and_then(|v| v.as_str()).unwrap_or(""),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
