// Poise `check` functions for role-gated commands. The caller's Discord role
// names are resolved here and handed to `AccessPolicy`, which decides.

use crate::core::access::Capability;
use crate::discord::{Context, Data, Error};
use poise::serenity_prelude as serenity;

/// Names of `role_ids` in `guild_id`, from the cache with an HTTP fallback.
pub async fn role_names(
    cache: &serenity::Cache,
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    role_ids: &[serenity::RoleId],
) -> Vec<String> {
    let cached: Option<Vec<String>> = cache.guild(guild_id).map(|guild| {
        role_ids
            .iter()
            .filter_map(|id| guild.roles.get(id).map(|role| role.name.clone()))
            .collect()
    });
    if let Some(names) = cached {
        return names;
    }

    match guild_id.roles(http).await {
        Ok(roles) => role_ids
            .iter()
            .filter_map(|id| roles.get(id).map(|role| role.name.clone()))
            .collect(),
        Err(e) => {
            tracing::warn!(guild_id = guild_id.get(), error = %e, "Could not fetch guild roles");
            Vec::new()
        }
    }
}

/// Whether a guild member holds the group mapped to `capability`.
pub async fn member_permits(
    ctx: &serenity::Context,
    data: &Data,
    member: Option<&serenity::Member>,
    capability: Capability,
) -> bool {
    let Some(member) = member else {
        return false;
    };
    let names = role_names(&ctx.cache, &ctx.http, member.guild_id, &member.roles).await;
    data.access.permits(capability, &names)
}

async fn require(ctx: Context<'_>, capability: Capability) -> Result<bool, Error> {
    let role_ids = match (ctx.guild_id(), ctx.author_member().await) {
        (Some(guild_id), Some(member)) => Some((guild_id, member.roles.clone())),
        _ => None,
    };
    let names = match role_ids {
        Some((guild_id, ids)) => role_names(ctx.cache(), ctx.http(), guild_id, &ids).await,
        None => Vec::new(),
    };

    let access = &ctx.data().access;
    if access.permits(capability, &names) {
        return Ok(true);
    }

    tracing::info!(
        user_id = ctx.author().id.get(),
        command = %ctx.command().name,
        ?capability,
        "Command denied"
    );
    ctx.send(
        poise::CreateReply::default()
            .content(access.denial(capability))
            .ephemeral(true),
    )
    .await?;
    Ok(false)
}

pub async fn captain_only(ctx: Context<'_>) -> Result<bool, Error> {
    require(ctx, Capability::Captain).await
}

pub async fn council_only(ctx: Context<'_>) -> Result<bool, Error> {
    require(ctx, Capability::Council).await
}
