use super::{BotStats, ChatService};
use crate::commands;
use crate::types::{BotError, InboundMessage, Result};
use serenity::async_trait;
use serenity::model::channel::{Channel, ChannelType, Message};
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, UserId};
use serenity::prelude::{Client, Context, EventHandler, GatewayIntents};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, warn};

/// Serenity event handler bridging Discord to the [`ChatService`].
pub struct DiscordHandler {
    service: Arc<ChatService>,
    stats: Arc<BotStats>,
    bot_id: OnceLock<UserId>,
}

impl DiscordHandler {
    pub fn new(service: Arc<ChatService>, stats: Arc<BotStats>) -> Self {
        Self {
            service,
            stats,
            bot_id: OnceLock::new(),
        }
    }

    async fn handle_message(&self, ctx: &Context, msg: &Message) -> Result<()> {
        if msg.author.bot {
            return Ok(());
        }

        let is_direct = msg.guild_id.is_none();
        let mentions_bot = self
            .bot_id
            .get()
            .map(|id| msg.mentions_user_id(*id) || msg.content.contains(&format!("<@{}>", id)))
            .unwrap_or(false);

        let in_thread = needs_thread_lookup(
            &msg.content,
            self.service.prefix(),
            is_direct,
            mentions_bot,
        ) && is_thread(ctx, msg.channel_id).await;

        let inbound = InboundMessage {
            conversation_id: msg.channel_id.to_string(),
            content: msg.content.clone(),
            author_is_bot: msg.author.bot,
            is_direct,
            in_thread,
            mentions_bot,
        };

        let Some(action) = self.service.plan(&inbound) else {
            return Ok(());
        };

        if action.needs_generation() {
            if let Err(e) = msg.channel_id.broadcast_typing(&ctx.http).await {
                warn!(error = %e, "Failed to send typing indicator");
            }
        }

        let replies = self.service.execute(action).await;
        debug!(channel_id = %msg.channel_id, fragments = replies.len(), "Sending replies");

        for reply in replies {
            msg.reply(ctx, reply)
                .await
                .map_err(|e| BotError::Discord(format!("Failed to send reply: {}", e)))?;
        }
        Ok(())
    }
}

/// Thread lookup costs an HTTP round trip; it only matters for guild
/// messages that are neither mentions nor recognised commands.
fn needs_thread_lookup(content: &str, prefix: &str, is_direct: bool, mentions_bot: bool) -> bool {
    !is_direct && !mentions_bot && commands::parse(content, prefix).is_none()
}

async fn is_thread(ctx: &Context, channel_id: ChannelId) -> bool {
    match channel_id.to_channel(ctx).await {
        Ok(Channel::Guild(channel)) => matches!(
            channel.kind,
            ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
        ),
        Ok(_) => false,
        Err(e) => {
            warn!(channel_id = %channel_id, error = %e, "Failed to fetch channel");
            false
        }
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        let _ = self.bot_id.set(ready.user.id);
        self.stats.set_guild_count(ready.guilds.len());
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Logged in to Discord"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if let Err(e) = self.handle_message(&ctx, &msg).await {
            if e.is_recoverable() {
                warn!(channel_id = %msg.channel_id, error = %e, "Message handling degraded");
            } else {
                error!(channel_id = %msg.channel_id, error = %e, "Failed to handle message");
            }
        }
    }
}

/// Gateway intents the bot needs: guild and DM messages with content.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Connects to Discord and processes events until the connection ends.
pub async fn run(token: &str, handler: DiscordHandler) -> Result<()> {
    let mut client = Client::builder(token, intents())
        .event_handler(handler)
        .await
        .map_err(|e| BotError::Discord(format!("Failed to create client: {}", e)))?;

    client
        .start()
        .await
        .map_err(|e| BotError::Discord(format!("Gateway error: {}", e)))
}
