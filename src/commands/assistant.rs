//! Summary and chat commands

use super::common::CommandContext;
use crate::{
    accounts::Session,
    assistant::{self, ChatHistory, GeminiClient, TextGenerator, TurnRole},
    core::chat_history_path,
    scoring::ScoreSheet,
    storage::TableStore,
    Result,
};

/// The part of the score table a session may share with the assistant.
fn scoped_sheet(sheet: ScoreSheet, session: &Session) -> ScoreSheet {
    if session.is_admin() {
        sheet
    } else {
        sheet.restricted_to_class(&session.class_name)
    }
}

fn gemini<S>(ctx: &CommandContext<S>) -> Result<GeminiClient> {
    GeminiClient::new(ctx.config.gemini_api_key()?, &ctx.config.gemini_model)
}

/// Center-wide summary; admin only.
pub async fn summary<S: TableStore, G: TextGenerator>(
    ctx: &CommandContext<S>,
    session: &Session,
    generator: &G,
) -> Result<String> {
    session.require_admin("summary")?;
    let sheet = ctx.load_scores().await?;
    Ok(assistant::summarize(generator, &sheet, &ctx.rubric).await)
}

/// Handle the summary command
pub async fn handle_summary<S: TableStore>(ctx: &CommandContext<S>) -> Result<()> {
    let session = ctx.session()?;
    let generator = gemini(ctx)?;
    println!("{}", summary(ctx, &session, &generator).await?);
    Ok(())
}

/// Ask one question, continuing the saved conversation or seeding a new one
/// from the score data the session may see.
pub async fn chat<S: TableStore, G: TextGenerator>(
    ctx: &CommandContext<S>,
    session: &Session,
    generator: &G,
    question: &str,
) -> Result<String> {
    let path = chat_history_path(&ctx.cache_dir, &session.username);
    let mut history = match ChatHistory::load_from(&path)? {
        Some(history) => history,
        None => {
            let sheet = scoped_sheet(ctx.load_scores().await?, session);
            ChatHistory::seeded(&sheet, &ctx.rubric)?
        }
    };

    let reply = history.ask(generator, question).await;
    history.save_to(&path)?;
    Ok(reply)
}

/// Handle the chat command
pub async fn handle_chat<S: TableStore>(
    ctx: &CommandContext<S>,
    question: Option<String>,
    reset: bool,
) -> Result<()> {
    let session = ctx.session()?;
    let path = chat_history_path(&ctx.cache_dir, &session.username);

    if reset && ChatHistory::discard(&path)? {
        println!("✓ Started a new conversation");
    }

    match question {
        Some(question) => {
            let generator = gemini(ctx)?;
            println!("{}", chat(ctx, &session, &generator, &question).await?);
        }
        None if !reset => {
            let history = ChatHistory::load_from(&path)?.unwrap_or_default();
            let mut shown = 0;
            for turn in history.visible_turns() {
                let who = match turn.role {
                    TurnRole::User => "🧑",
                    TurnRole::Model => "🤖",
                };
                println!("{} {}\n", who, turn.text);
                shown += 1;
            }
            if shown == 0 {
                println!("No conversation yet. Ask: weekly-score chat \"...\"");
            }
        }
        None => {}
    }
    Ok(())
}
