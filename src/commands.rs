use std::{error::Error, fmt, io::Write, path::Path};

use color_eyre::Result;
use tracing::{debug, info};

use crate::{
    cli::{DeleteArgs, EditArgs, ExecuteArgs, GetArgs, WebhookCommand},
    config::Config,
    discord::{Dispatcher, MessagePayload, Method, Validation, WEBHOOK_PREFIX},
};

/// Discord refuses message content longer than this many characters.
pub const MAX_CONTENT_LEN: usize = 2000;

/// Bad user input. Reported as `ERROR: ...` with a zero exit status.
#[derive(Debug)]
pub struct Rejection(pub String);

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for Rejection {}

fn reject<T>(msg: impl Into<String>) -> Result<T> {
    Err(Rejection(msg.into()).into())
}

/// Joins `args[start..]` with single spaces.
pub fn build_content(args: &[String], start: usize) -> String {
    args.get(start..)
        .unwrap_or_default()
        .join(" ")
        .trim()
        .to_owned()
}

/// Plain URLs pass through untouched. Anything else names a saved webhook,
/// and only then is the config file read.
fn resolve_target(target: &str, config_path: &Path) -> Result<String> {
    if target.starts_with("https://") || target.starts_with("http://") {
        return Ok(target.into());
    }
    match Config::load_from(config_path)?.webhooks.remove(target) {
        Some(url) => Ok(url),
        None => reject(format!("Webhook named '{target}' not found.")),
    }
}

fn ensure_valid(dispatcher: &Dispatcher, url: &str, shown: &str) -> Result<()> {
    match dispatcher.validate(url) {
        Validation::Valid => Ok(()),
        Validation::BadPrefix => reject(format!("'{shown}' is not a valid webhook URL")),
        Validation::Unauthorized => reject(format!("'{shown}' is not a valid webhook token")),
    }
}

fn message_content(flag: Option<String>, words: &[String]) -> Result<String> {
    let content = flag.unwrap_or_else(|| build_content(words, 0));
    if content.is_empty() {
        return reject("Message flag required.");
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return reject(format!(
            "Message is longer than {MAX_CONTENT_LEN} characters."
        ));
    }
    Ok(content)
}

fn message_url(url: &str, mid: u64) -> String {
    format!("{}/messages/{mid}", url.trim_end_matches('/'))
}

/// Builds the execute body. `defaults` fills in username and avatar when
/// their flags are absent.
pub fn execute_payload(args: ExecuteArgs, defaults: &Config) -> Result<MessagePayload> {
    Ok(MessagePayload {
        content: Some(message_content(args.message, &args.words)?),
        username: args.username.or_else(|| defaults.username.clone()),
        avatar_url: args.avatar_url.or_else(|| defaults.avatar_url.clone()),
        tts: args.tts.then_some(true),
    })
}

pub fn execute(dispatcher: &Dispatcher, config_path: &Path, mut args: ExecuteArgs) -> Result<()> {
    let Some(target) = args.url.take() else {
        return reject("Webhook URL required.");
    };
    let url = resolve_target(&target, config_path)?;
    ensure_valid(dispatcher, &url, &target)?;
    let payload = execute_payload(args, &Config::peek(config_path))?;
    dispatcher.dispatch(Method::Post, &url, &payload)?;
    info!("message sent");
    Ok(())
}

pub fn edit(dispatcher: &Dispatcher, config_path: &Path, args: EditArgs) -> Result<()> {
    let url = message_url(&resolve_target(&args.url, config_path)?, args.message_id);
    ensure_valid(dispatcher, &url, &args.url)?;
    let payload = MessagePayload {
        content: Some(message_content(args.message, &args.words)?),
        ..Default::default()
    };
    dispatcher.dispatch(Method::Patch, &url, &payload)?;
    info!(mid = args.message_id, "message edited");
    Ok(())
}

pub fn get(
    dispatcher: &Dispatcher,
    config_path: &Path,
    args: GetArgs,
    out: &mut impl Write,
) -> Result<()> {
    let url = resolve_target(&args.url, config_path)?;
    ensure_valid(dispatcher, &url, &args.url)?;
    let message = dispatcher.fetch(&url)?;
    let fields = args.fields();
    if fields.is_empty() {
        writeln!(out, "{}", serde_json::to_string_pretty(&message)?)?;
        return Ok(());
    }
    for field in fields {
        writeln!(out, "{}: {}", field.name(), field.extract(&message))?;
    }
    Ok(())
}

pub fn delete(
    dispatcher: &Dispatcher,
    config_path: &Path,
    args: DeleteArgs,
    out: &mut impl Write,
) -> Result<()> {
    let mut url = resolve_target(&args.url, config_path)?;
    if let Some(mid) = args.message_id {
        url = message_url(&url, mid);
    }
    ensure_valid(dispatcher, &url, &args.url)?;
    dispatcher.remove(&url)?;
    writeln!(out, "Done!")?;
    Ok(())
}

pub fn webhook(config: &mut Config, command: WebhookCommand, out: &mut impl Write) -> Result<()> {
    match command {
        WebhookCommand::Add { name, url } => {
            if !url.starts_with(WEBHOOK_PREFIX) {
                return reject(format!("'{url}' is not a valid webhook URL"));
            }
            debug!(%name, "saving webhook");
            config.webhooks.insert(name, url);
        }
        WebhookCommand::Delete { name } => {
            if config.webhooks.remove(&name).is_none() {
                return reject(format!("Webhook named '{name}' not found."));
            }
        }
        WebhookCommand::List => {
            for (name, url) in &config.webhooks {
                writeln!(out, "{name}: {url}")?;
            }
        }
    }
    Ok(())
}
