//! The chat side of a multi step interaction.
//!
//! [`Conversation`] is everything the match recording needs from the chat: an
//! acknowledged response it can rewrite, single replies from the invoking user,
//! short lived notices and a confirm/cancel choice. [`InteractionConversation`]
//! backs it with a serenity slash command interaction.

use std::time::Duration;

use serenity::all::{
    ButtonStyle, CommandInteraction, ComponentInteraction, Context, CreateActionRow, CreateButton,
    CreateInteractionResponse, CreateInteractionResponseFollowup, EditInteractionResponse,
    MessageId,
};

const CONFIRM_ID: &str = "record:confirm";
const CANCEL_ID: &str = "record:cancel";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("discord: {0}")]
    Discord(#[from] serenity::Error),
    #[error("conversation unavailable: {0}")]
    Unavailable(String),
}

/// A message sent by the invoking user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub id: u64,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Confirm,
    Cancel,
}

#[async_trait::async_trait]
pub trait Conversation: Send + Sync {
    /// Deferred acknowledgement, only visible to the invoking user.
    async fn acknowledge(&self) -> Result<(), TransportError>;

    /// Replaces the content of the acknowledged response and drops its buttons.
    async fn show(&self, content: &str) -> Result<(), TransportError>;

    /// Waits for the next message of the invoking user in the channel.
    ///
    /// `Ok(None)` means the window closed without a reply.
    async fn next_reply(&self, timeout: Duration) -> Result<Option<Reply>, TransportError>;

    /// Removes a reply from the channel. Best effort.
    async fn discard(&self, reply: &Reply);

    /// A notice only the invoking user sees, removed again after `lifetime`.
    async fn notify(&self, content: &str, lifetime: Duration) -> Result<(), TransportError>;

    /// Shows `content` with a confirm and a cancel button and waits for the
    /// invoking user to press one. `Ok(None)` means nothing was pressed in time.
    async fn choose(
        &self,
        content: &str,
        confirm_label: &str,
        cancel_label: &str,
        timeout: Duration,
    ) -> Result<Option<Choice>, TransportError>;
}

pub struct InteractionConversation<'a> {
    ctx: &'a Context,
    command: &'a CommandInteraction,
}

impl<'a> InteractionConversation<'a> {
    pub fn new(ctx: &'a Context, command: &'a CommandInteraction) -> Self {
        Self { ctx, command }
    }

    async fn settle(
        &self,
        interaction: &ComponentInteraction,
    ) -> Result<Option<Choice>, TransportError> {
        interaction
            .create_response(&self.ctx.http, CreateInteractionResponse::Acknowledge)
            .await?;

        Ok(match interaction.data.custom_id.as_str() {
            CONFIRM_ID => Some(Choice::Confirm),
            CANCEL_ID => Some(Choice::Cancel),
            other => {
                tracing::warn!("Unexpected component {:?}", other);
                None
            }
        })
    }
}

#[async_trait::async_trait]
impl Conversation for InteractionConversation<'_> {
    async fn acknowledge(&self) -> Result<(), TransportError> {
        self.command.defer_ephemeral(&self.ctx.http).await?;
        Ok(())
    }

    async fn show(&self, content: &str) -> Result<(), TransportError> {
        self.command
            .edit_response(
                &self.ctx.http,
                EditInteractionResponse::new()
                    .content(content)
                    .components(Vec::new()),
            )
            .await?;
        Ok(())
    }

    async fn next_reply(&self, timeout: Duration) -> Result<Option<Reply>, TransportError> {
        let message = self
            .command
            .channel_id
            .await_reply(&self.ctx.shard)
            .author_id(self.command.user.id)
            .timeout(timeout)
            .await;

        Ok(message.map(|m| Reply {
            id: m.id.get(),
            content: m.content,
        }))
    }

    async fn discard(&self, reply: &Reply) {
        if let Err(e) = self
            .command
            .channel_id
            .delete_message(&self.ctx.http, MessageId::new(reply.id))
            .await
        {
            tracing::debug!("Deleting reply {}: {:?}", reply.id, e);
        }
    }

    async fn notify(&self, content: &str, lifetime: Duration) -> Result<(), TransportError> {
        let notice = self
            .command
            .create_followup(
                &self.ctx.http,
                CreateInteractionResponseFollowup::new()
                    .content(content)
                    .ephemeral(true),
            )
            .await?;

        let http = self.ctx.http.clone();
        let command = self.command.clone();
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            if let Err(e) = command.delete_followup(&http, notice.id).await {
                tracing::debug!("Deleting notice: {:?}", e);
            }
        });

        Ok(())
    }

    async fn choose(
        &self,
        content: &str,
        confirm_label: &str,
        cancel_label: &str,
        timeout: Duration,
    ) -> Result<Option<Choice>, TransportError> {
        let buttons = CreateActionRow::Buttons(vec![
            CreateButton::new(CONFIRM_ID)
                .label(confirm_label)
                .style(ButtonStyle::Success),
            CreateButton::new(CANCEL_ID)
                .label(cancel_label)
                .style(ButtonStyle::Danger),
        ]);

        let message = self
            .command
            .edit_response(
                &self.ctx.http,
                EditInteractionResponse::new()
                    .content(content)
                    .components(vec![buttons]),
            )
            .await?;

        let pressed = message
            .await_component_interaction(&self.ctx.shard)
            .author_id(self.command.user.id)
            .timeout(timeout)
            .await;

        match pressed {
            Some(interaction) => self.settle(&interaction).await,
            None => Ok(None),
        }
    }
}
