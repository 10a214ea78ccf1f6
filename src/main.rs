// Entry point of the ladder reset bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (JSON files, configuration)
// - `discord/` = Discord-specific adapters (commands, components, DMs)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;

use crate::core::access::AccessPolicy;
use crate::core::roster::{RosterService, RosterSettings};
use crate::core::wizard::WizardService;
use crate::discord::commands::presence;
use crate::discord::{Data, Error};
use crate::infra::catalog::load_catalog;
use crate::infra::config::BotConfig;
use crate::infra::roster::JsonDocumentStore;

const WIZARD_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Event handler for non-command Discord events: select menus, buttons and
/// modal submissions.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::InteractionCreate { interaction } = event {
        if let Err(e) = discord::components::handle_interaction(ctx, data, interaction).await {
            tracing::error!(error = %e, "Error handling interaction");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", config.data_dir.display()))?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let store = JsonDocumentStore::new(&config.data_dir);
    let roster = Arc::new(RosterService::new(
        store,
        RosterSettings {
            captain_is_member: config.captain_is_member,
        },
    ));
    let catalog = Arc::new(load_catalog(config.catalog_path()).await);
    // BotConfig bounds the timeout to a week, well inside what chrono accepts.
    let wizard_ttl = chrono::Duration::seconds(config.wizard_timeout_secs as i64);
    let wizard = Arc::new(WizardService::new(Arc::clone(&roster), catalog, wizard_ttl));
    let access = Arc::new(AccessPolicy::new(
        config.captain_role.clone(),
        config.council_role.clone(),
    ));

    let data = Data {
        roster: Arc::clone(&roster),
        wizard: Arc::clone(&wizard),
        access,
        plan_timeout: Duration::from_secs(config.plan_timeout_secs),
    };

    tracing::info!(
        data_dir = %config.data_dir.display(),
        captain_role = %config.captain_role,
        council_role = %config.council_role,
        captain_is_member = config.captain_is_member,
        "Configuration loaded"
    );

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    // MESSAGE_CONTENT lets the plan dialogue read what the captain types.
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let guild_id = config.guild_id;
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            on_error: |error| Box::pin(discord::error_reply::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("Bot is starting up");

                match guild_id {
                    // Guild registration is instant, handy while testing
                    Some(id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(id),
                        )
                        .await?;
                        tracing::info!(guild_id = id, "Commands registered in guild");
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        tracing::info!("Commands registered globally");
                    }
                }

                let team_count = match data.roster.teams().await {
                    Ok(teams) => teams.0.len(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Could not read teams at startup");
                        0
                    }
                };
                presence::on_ready(ctx, team_count);

                // Drop wizard sessions nobody has touched in a while.
                let wizard = Arc::clone(&data.wizard);
                tokio::spawn(async move {
                    loop {
                        tokio::time::sleep(WIZARD_SWEEP_INTERVAL).await;
                        let expired = wizard.sweep_expired();
                        if expired > 0 {
                            tracing::debug!(expired, "Expired wizard sessions dropped");
                        }
                    }
                });

                tracing::info!("Bot is ready");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
