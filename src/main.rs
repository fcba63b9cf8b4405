//! Entry point: parse CLI and dispatch to command handlers.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use weekly_score::{
    cli::{Commands, WeeklyScore},
    commands::{
        assistant::{handle_chat, handle_summary},
        auth::{handle_login, handle_logout, handle_whoami},
        common::today,
        info::{handle_rubric, handle_week},
        scores::{
            handle_edit, handle_import, handle_init_sheet, handle_show, handle_submit,
            SubmitParams,
        },
        CommandContext,
    },
    core::cache_root,
    Result, Rubric,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI.
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let app = WeeklyScore::parse();

    // Commands that never touch the table store
    match app.command {
        Commands::Logout => return handle_logout(&cache_root()),
        Commands::Whoami => return handle_whoami(&cache_root()),
        Commands::Week { date } => {
            handle_week(date.unwrap_or_else(today));
            return Ok(());
        }
        Commands::Rubric { json } => return handle_rubric(&Rubric::standard(), json),
        _ => {}
    }

    let ctx = CommandContext::from_env(app.backend)?;

    match app.command {
        Commands::Login { username, password } => {
            handle_login(&ctx, &username, password).await?
        }
        Commands::Submit {
            counts,
            class,
            date,
        } => {
            handle_submit(
                &ctx,
                SubmitParams {
                    counts,
                    class,
                    date: date.unwrap_or_else(today),
                },
            )
            .await?
        }
        Commands::Show { class, week, json } => handle_show(&ctx, class, week, json).await?,
        Commands::Edit { file, replace } => handle_edit(&ctx, &file, replace).await?,
        Commands::Summary => handle_summary(&ctx).await?,
        Commands::Chat { question, reset } => handle_chat(&ctx, question, reset).await?,
        Commands::InitSheet => handle_init_sheet(&ctx).await?,
        Commands::Import { sheet, file } => handle_import(&ctx, &sheet, &file).await?,
        Commands::Logout | Commands::Whoami | Commands::Week { .. } | Commands::Rubric { .. } => {}
    }

    Ok(())
}
