use std::{error::Error, io::Write, path::PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, EntryKind, RegisterUserCmd, ReportFormat, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "ledgerbook_admin")]
#[command(about = "Admin utilities for Ledgerbook (bootstrap users, export reports)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./ledgerbook.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Write a report of the entries visible to a user.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a login and its profile. The password is prompted for.
    Create(UserCreateArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Owner,
    Staff,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Owner => Role::Owner,
            RoleArg::Staff => Role::Staff,
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long, value_enum, default_value_t = RoleArg::Staff)]
    role: RoleArg,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Income,
    Expense,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Xlsx,
    Pdf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// User whose read scope selects the entries.
    #[arg(long)]
    user: String,
    #[arg(long, value_enum)]
    kind: KindArg,
    #[arg(long, value_enum, default_value_t = FormatArg::Xlsx)]
    format: FormatArg,
    /// Report date used in the file name, `YYYY-MM-DD`. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Directory the file is written to.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn print_line(message: &str) -> CliResult<()> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    out.flush()?;
    Ok(())
}

/// Read a line without echoing it back.
fn prompt_password(prompt: &str) -> CliResult<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace if buf.pop().is_some() => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => continue,
        }
        out.flush()?;
    }

    Ok(buf)
}

fn prompt_new_password() -> CliResult<String> {
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            print_line("Password must not be empty.")?;
            continue;
        }
        if prompt_password("Confirm password: ")? == first {
            return Ok(first);
        }
        print_line("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn create_user(engine: &Engine, args: UserCreateArgs) -> CliResult<()> {
    let password = prompt_new_password()?;

    let mut cmd = RegisterUserCmd::new(&args.username, password, args.role.into());
    if let Some(name) = args.name {
        cmd = cmd.name(name);
    }
    if let Some(email) = args.email {
        cmd = cmd.email(email);
    }

    match engine.register_user(cmd).await {
        Ok(profile) => {
            println!("created user: {} ({})", profile.username, profile.role.as_str());
            Ok(())
        }
        Err(EngineError::ExistingKey(username)) => {
            eprintln!("user already exists: {username}");
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

async fn export(engine: &Engine, args: ExportArgs) -> CliResult<()> {
    let kind = match args.kind {
        KindArg::Income => EntryKind::Income,
        KindArg::Expense => EntryKind::Expense,
    };
    let format = match args.format {
        FormatArg::Xlsx => ReportFormat::Spreadsheet,
        FormatArg::Pdf => ReportFormat::Paginated,
    };
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());

    let export = engine.export(&args.user, kind, format, date).await?;
    let path = args.out.join(&export.file_name);
    std::fs::write(&path, &export.bytes)?;
    println!("wrote {} ({} bytes)", path.display(), export.bytes.len());
    Ok(())
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => create_user(&engine, args).await,
        Command::Export(args) => export(&engine, args).await,
    }
}
