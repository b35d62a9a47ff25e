use clap::{Parser, Subcommand};

use crate::fields::Field;

/// Send, edit, inspect and delete Discord webhook messages
#[derive(Parser, Debug)]
#[command(author, version, about, args_conflicts_with_subcommands = true)]
pub struct Args {
    /// Subcommand
    #[clap(subcommand)]
    pub command: Option<Command>,
    // `dishook <url> [message]` is shorthand for `execute`
    #[clap(flatten)]
    pub execute: ExecuteArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a message through a webhook
    Execute(ExecuteArgs),
    /// Edit a message sent by a webhook
    Edit(EditArgs),
    /// Fetch a webhook message and print its fields
    Get(GetArgs),
    /// Delete a webhook message
    Delete(DeleteArgs),
    /// Manage saved webhooks
    Webhook {
        #[clap(subcommand)]
        command: WebhookCommand,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct ExecuteArgs {
    /// Webhook URL or the name of a saved webhook
    pub url: Option<String>,
    /// Message text, used when --message is not given
    pub words: Vec<String>,
    /// Sets the webhook's profile picture
    #[clap(short, long)]
    pub avatar_url: Option<String>,
    /// Sets the message
    #[clap(short, long)]
    pub message: Option<String>,
    /// Sets the username of the webhook
    #[clap(short, long)]
    pub username: Option<String>,
    /// Enables text-to-speech
    #[clap(short, long)]
    pub tts: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Webhook URL or the name of a saved webhook
    pub url: String,
    /// ID of the message to edit
    pub message_id: u64,
    /// New message text, used when --message is not given
    pub words: Vec<String>,
    /// Sets the new message
    #[clap(short, long)]
    pub message: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Webhook URL (or saved webhook name) of the message
    pub url: String,
    /// Appended to the URL as /messages/<id>
    pub message_id: Option<u64>,
}

/// With no flags the whole message is printed as JSON.
#[derive(clap::Args, Debug, Default)]
pub struct GetArgs {
    /// Webhook message URL or the name of a saved webhook
    pub url: String,

    /// Avatar hash of the author
    #[clap(short, long)]
    pub avatar_url: bool,
    /// Whether the author is a bot
    #[clap(short, long)]
    pub bot: bool,
    /// Author discriminator
    #[clap(short, long)]
    pub discriminator: bool,
    /// Author ID
    #[clap(long)]
    pub author_id: bool,
    /// Author name
    #[clap(short, long)]
    pub username: bool,

    /// Message content
    #[clap(short, long)]
    pub message: bool,
    /// Message ID
    #[clap(short = 's', long)]
    pub message_id: bool,
    /// Channel ID
    #[clap(short, long)]
    pub channel_id: bool,
    /// Whether @everyone is mentioned
    #[clap(short = 'e', long)]
    pub mentions_everyone: bool,
    /// Mentioned roles
    #[clap(short = 'r', long)]
    pub mention_roles: bool,
    /// Whether the message is pinned
    #[clap(short, long)]
    pub pinned: bool,
    /// When the message was sent
    #[clap(long)]
    pub timestamp: bool,
    /// Whether TTS was used
    #[clap(short, long)]
    pub tts: bool,

    /// Webhook ID
    #[clap(long)]
    pub webhook_id: bool,
    /// Message type
    #[clap(long)]
    pub webhook_type: bool,

    /// Message components
    #[clap(long)]
    pub components: bool,
    /// When the message was last edited
    #[clap(long)]
    pub edited_timestamp: bool,
    /// Message embeds
    #[clap(long)]
    pub embeds: bool,
    /// Message flags
    #[clap(long)]
    pub flags: bool,
}

impl GetArgs {
    pub fn fields(&self) -> Vec<Field> {
        [
            (self.avatar_url, Field::AvatarUrl),
            (self.bot, Field::Bot),
            (self.discriminator, Field::Discriminator),
            (self.author_id, Field::AuthorId),
            (self.username, Field::Username),
            (self.message, Field::Message),
            (self.message_id, Field::MessageId),
            (self.channel_id, Field::ChannelId),
            (self.mentions_everyone, Field::MentionsEveryone),
            (self.mention_roles, Field::MentionRoles),
            (self.pinned, Field::Pinned),
            (self.timestamp, Field::Timestamp),
            (self.tts, Field::Tts),
            (self.webhook_id, Field::WebhookId),
            (self.webhook_type, Field::WebhookType),
            (self.components, Field::Components),
            (self.edited_timestamp, Field::EditedTimestamp),
            (self.embeds, Field::Embeds),
            (self.flags, Field::Flags),
        ]
        .into_iter()
        .filter_map(|(on, field)| on.then_some(field))
        .collect()
    }
}

#[derive(Subcommand, Debug)]
pub enum WebhookCommand {
    /// Save a webhook under a name
    Add { name: String, url: String },
    /// Forget a saved webhook
    Delete { name: String },
    /// List saved webhooks
    List,
}
