mod commands;
mod config;
mod constants;
mod database;
mod handlers;
mod models;
mod repository;
mod schedule;
mod selection;
mod services;
mod utils;

use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    commands::{keyword, movie, prize, setup, stats, task},
    config::{BotMode, Config},
    constants::LOG_DIRECTIVE,
    database::Database,
    handlers::handle_interaction,
    models::Data,
    repository::GuildRepository,
    schedule::{DiscordWorkflows, StartOutcome},
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    initialize_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Starting in {} mode", config.mode);
    if let Some(client_id) = config.client_id {
        info!("Application id: {}", client_id);
    }

    let db = match Database::new(&config.database_url, config.guild_scope()).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let token = config.discord_token.clone();
    let data = Data::new(db, config);

    if let Err(e) = start_bot(token, data).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the logging system
fn initialize_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(LOG_DIRECTIVE.parse().expect("valid log directive")),
        )
        .init();
}

/// Start the weekly jobs of every guild that had its scheduler switched on
async fn restore_schedulers(http: Arc<serenity::Http>, data: &Data) {
    let guilds = match data.db.get_all_guilds().await {
        Ok(guilds) => guilds,
        Err(e) => {
            error!("Failed to load guild configs, no schedulers restored: {}", e);
            return;
        }
    };

    let mut restored = 0;
    for config in guilds.into_iter().filter(|c| c.toggles.task_scheduler) {
        let workflows = Arc::new(DiscordWorkflows::new(http.clone(), data.clone()));
        match data.scheduler.start(config.guild_id, workflows) {
            Ok(StartOutcome::Started) => restored += 1,
            Ok(outcome) => warn!("Scheduler for guild {} not restored: {:?}", config.guild_id, outcome),
            Err(e) => error!("Failed to restore scheduler for guild {}: {}", config.guild_id, e),
        }
    }
    info!("Restored {} guild scheduler(s)", restored);
}

/// Create and start the Discord bot
async fn start_bot(token: String, data: Data) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![setup(), task(), keyword(), prize(), movie(), stats()],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::InteractionCreate {
                        interaction: serenity::Interaction::Component(component),
                    } = event
                    {
                        handle_interaction(ctx, component.clone(), data).await;
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Connected as {}", ready.user.name);

                match (data.config.mode, data.config.dev_guild_id) {
                    (BotMode::Dev, Some(guild_id)) => {
                        info!("Registering commands in development guild: {}", guild_id);
                        poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                            .await?;
                    }
                    _ => {
                        info!("Registering commands globally (may take up to 1 hour)");
                        poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    }
                }

                restore_schedulers(ctx.http.clone(), &data).await;

                info!("Bot is ready!");
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    client.start().await?;

    Ok(())
}
