use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use contaerp_infra::{PostgresDatabase, Problem, Services, Settings};
use contaerp_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "contaerp-admin")]
#[command(about = "Maintenance tasks for a ContaERP database")]
struct Cli {
    /// Database connection string; overrides `contaerp.toml`.
    #[arg(long, env = "CONTAERP_DATABASE_URL")]
    database_url: Option<String>,

    /// Log output: `text` or `json`.
    #[arg(long, env = "CONTAERP_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Print reports as JSON instead of one line per problem.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the pending SQL migrations.
    Migrate,
    /// Deep-check customer and supplier invoices.
    CheckInvoices {
        /// Only invoices of this fiscal year.
        #[arg(long)]
        year: Option<String>,
    },
    /// Deep-check journal entries.
    CheckEntries {
        #[arg(long)]
        year: Option<String>,
    },
    /// Fix rounding drift in journal entries.
    FixEntries {
        #[arg(long)]
        year: Option<String>,
    },
    /// Renumber the entries of a fiscal year by date.
    RenumberEntries {
        #[arg(long)]
        year: String,
    },
    /// Close a fiscal year.
    CloseYear {
        #[arg(long)]
        year: String,
    },
}

fn exit_code(problems: &[Problem]) -> ExitCode {
    if problems.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn report(problems: &[Problem], json: bool) -> anyhow::Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(problems)?);
        return Ok(exit_code(problems));
    }
    for problem in problems {
        for message in &problem.messages {
            println!("{}: {message}", problem.document);
        }
    }
    if problems.is_empty() {
        println!("no problems found");
    } else {
        println!("{} with problems", problems.len());
    }
    Ok(exit_code(problems))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    contaerp_observability::init_with(cli.log_format, "info");

    let mut settings = Settings::load().context("loading settings")?;
    if let Some(url) = cli.database_url {
        settings.database_url = url;
    }
    let db = PostgresDatabase::connect(&settings.database())
        .await
        .context("connecting to the database")?;

    if let Command::Migrate = cli.command {
        db.migrate().await.context("running migrations")?;
        info!("migrations applied");
        return Ok(ExitCode::SUCCESS);
    }

    let services = Services::new(Arc::new(db), &settings);
    let code = match cli.command {
        Command::Migrate => ExitCode::SUCCESS,
        Command::CheckInvoices { year } => {
            let mut problems = services.check_customer_invoices(year.as_deref()).await?;
            problems.extend(services.check_supplier_invoices(year.as_deref()).await?);
            report(&problems, cli.json)?
        }
        Command::CheckEntries { year } => report(&services.check_entries(year.as_deref()).await?, cli.json)?,
        Command::FixEntries { year } => {
            let summary = services.fix_entries(year.as_deref()).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                exit_code(&summary.failed)
            } else {
                println!("{} entries fixed", summary.fixed);
                report(&summary.failed, false)?
            }
        }
        Command::RenumberEntries { year } => {
            let changed = services.renumber_entries(&year).await?;
            println!("{changed} entries renumbered in {year}");
            ExitCode::SUCCESS
        }
        Command::CloseYear { year } => {
            services.close_fiscal_year(&year).await?;
            println!("fiscal year {year} closed");
            ExitCode::SUCCESS
        }
    };
    Ok(code)
}
