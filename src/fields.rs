use serde_json::Value;

/// A message field that `get` can print, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    AvatarUrl,
    Bot,
    Discriminator,
    AuthorId,
    Username,
    Message,
    MessageId,
    ChannelId,
    MentionsEveryone,
    MentionRoles,
    Pinned,
    Timestamp,
    Tts,
    WebhookId,
    WebhookType,
    Components,
    EditedTimestamp,
    Embeds,
    Flags,
}

impl Field {
    /// Name of the flag that selects this field.
    pub fn name(self) -> &'static str {
        match self {
            Field::AvatarUrl => "avatar-url",
            Field::Bot => "bot",
            Field::Discriminator => "discriminator",
            Field::AuthorId => "author-id",
            Field::Username => "username",
            Field::Message => "message",
            Field::MessageId => "message-id",
            Field::ChannelId => "channel-id",
            Field::MentionsEveryone => "mentions-everyone",
            Field::MentionRoles => "mention-roles",
            Field::Pinned => "pinned",
            Field::Timestamp => "timestamp",
            Field::Tts => "tts",
            Field::WebhookId => "webhook-id",
            Field::WebhookType => "webhook-type",
            Field::Components => "components",
            Field::EditedTimestamp => "edited-timestamp",
            Field::Embeds => "embeds",
            Field::Flags => "flags",
        }
    }

    fn pointer(self) -> &'static str {
        match self {
            Field::AvatarUrl => "/author/avatar",
            Field::Bot => "/author/bot",
            Field::Discriminator => "/author/discriminator",
            Field::AuthorId => "/author/id",
            Field::Username => "/author/username",
            Field::Message => "/content",
            Field::MessageId => "/id",
            Field::ChannelId => "/channel_id",
            Field::MentionsEveryone => "/mention_everyone",
            Field::MentionRoles => "/mention_roles",
            Field::Pinned => "/pinned",
            Field::Timestamp => "/timestamp",
            Field::Tts => "/tts",
            Field::WebhookId => "/webhook_id",
            Field::WebhookType => "/type",
            Field::Components => "/components",
            Field::EditedTimestamp => "/edited_timestamp",
            Field::Embeds => "/embeds",
            Field::Flags => "/flags",
        }
    }

    pub fn extract(self, message: &Value) -> String {
        message
            .pointer(self.pointer())
            .map_or_else(|| "null".to_owned(), render)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
