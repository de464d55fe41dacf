use poise::serenity_prelude::{
    self as serenity, ButtonStyle, ChannelType, ComponentInteractionDataKind, CreateActionRow,
    CreateButton, CreateInteractionResponse, CreateInteractionResponseMessage, CreateSelectMenu,
    CreateSelectMenuKind,
};
use tracing::info;

use super::custom_id::{ComponentAction, SetupField};
use super::interaction::reply_ephemeral;
use crate::models::{ChannelKind, Data, Error, GuildConfig, RoleKind};
use crate::utils::messages::{build_permission_error, format_success};
use crate::utils::permissions::AccessLevel;
use crate::utils::validation::{interaction_has_access, require_guild};

fn mention_channel(id: Option<serenity::ChannelId>) -> String {
    id.map(|c| format!("<#{}>", c))
        .unwrap_or_else(|| "*not set*".to_string())
}

/// Current state of the task setup wizard
pub fn task_setup_summary(config: &GuildConfig) -> String {
    let admin = config
        .roles
        .task_admin
        .map(|r| format!("<@&{}>", r))
        .unwrap_or_else(|| "*not set*".to_string());

    format!(
        "**Task setup**\nTask channel: {}\nVerification channel: {}\nTask admin role: {}",
        mention_channel(config.channels.task_channel),
        mention_channel(config.channels.task_verification),
        admin
    )
}

/// Select menus and the finish button of the task setup wizard
pub fn task_setup_components(config: &GuildConfig) -> Vec<CreateActionRow> {
    let channel_select = |field: SetupField, placeholder: &str, current: Option<serenity::ChannelId>| {
        CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                ComponentAction::TaskSetup(field).custom_id(),
                CreateSelectMenuKind::Channel {
                    channel_types: Some(vec![ChannelType::Text]),
                    default_channels: current.map(|c| vec![c]),
                },
            )
            .placeholder(placeholder),
        )
    };

    vec![
        channel_select(
            SetupField::TaskChannel,
            "Channel for polls and weekly tasks",
            config.channels.task_channel,
        ),
        channel_select(
            SetupField::VerificationChannel,
            "Channel where submissions are reviewed",
            config.channels.task_verification,
        ),
        CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                ComponentAction::TaskSetup(SetupField::TaskAdminRole).custom_id(),
                CreateSelectMenuKind::Role {
                    default_roles: config.roles.task_admin.map(|r| vec![r]),
                },
            )
            .placeholder("Role allowed to review submissions"),
        ),
        CreateActionRow::Buttons(vec![
            CreateButton::new(ComponentAction::TaskSetup(SetupField::Finish).custom_id())
                .label("Finish setup")
                .style(ButtonStyle::Success),
        ]),
    ]
}

/// Handle a selection or the finish button in the task setup wizard
pub(super) async fn handle_task_setup(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    field: SetupField,
) -> Result<(), Error> {
    let guild_id = require_guild(interaction.guild_id)?;

    if !interaction_has_access(ctx, interaction.member.as_ref(), data, AccessLevel::Admin).await? {
        let denial = build_permission_error(AccessLevel::Admin.label());
        return reply_ephemeral(ctx, interaction, denial).await;
    }

    let user_id = interaction.user.id;
    let configs = &data.guild_configs;

    let config = match (field, &interaction.data.kind) {
        (SetupField::TaskChannel, ComponentInteractionDataKind::ChannelSelect { values }) => {
            match values.first() {
                Some(channel) => {
                    configs
                        .set_channel(guild_id, ChannelKind::TaskChannel, *channel, user_id)
                        .await?
                }
                None => configs.get(guild_id).await?,
            }
        }
        (SetupField::VerificationChannel, ComponentInteractionDataKind::ChannelSelect { values }) => {
            match values.first() {
                Some(channel) => {
                    configs
                        .set_channel(guild_id, ChannelKind::TaskVerification, *channel, user_id)
                        .await?
                }
                None => configs.get(guild_id).await?,
            }
        }
        (SetupField::TaskAdminRole, ComponentInteractionDataKind::RoleSelect { values }) => {
            match values.first() {
                Some(role) => {
                    configs
                        .set_role(guild_id, RoleKind::TaskAdmin, *role, user_id)
                        .await?
                }
                None => configs.get(guild_id).await?,
            }
        }
        (SetupField::Finish, _) => {
            let config = configs.complete_task_setup(guild_id, user_id).await?;
            info!("Task setup completed for guild {} by {}", guild_id, user_id);

            let response = CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content(format!(
                        "{}\n\n{}",
                        task_setup_summary(&config),
                        format_success("Task setup complete. Enable the weekly schedule with `/task scheduler`.")
                    ))
                    .components(vec![]),
            );
            interaction.create_response(ctx, response).await?;
            return Ok(());
        }
        _ => configs.get(guild_id).await?,
    };

    let response = CreateInteractionResponse::UpdateMessage(
        CreateInteractionResponseMessage::new()
            .content(task_setup_summary(&config))
            .components(task_setup_components(&config)),
    );
    interaction.create_response(ctx, response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use poise::serenity_prelude::{ChannelId, GuildId, RoleId};

    #[test]
    fn test_task_setup_summary() {
        let mut config = GuildConfig::new(GuildId::new(1));
        config.channels.task_channel = Some(ChannelId::new(42));
        config.roles.task_admin = Some(RoleId::new(7));

        let summary = task_setup_summary(&config);
        assert!(summary.contains("Task channel: <#42>"));
        assert!(summary.contains("Verification channel: *not set*"));
        assert!(summary.contains("Task admin role: <@&7>"));
    }
}
