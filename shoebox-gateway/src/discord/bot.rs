use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serenity::async_trait;
use serenity::builder::{
    CreateCommand, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage,
};
use serenity::model::application::{Command, CommandInteraction, CommandType};
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{error, info};

use crate::snowflake;
use crate::transfer::Transferrer;

/// Name of the message context menu command.
pub const BACKUP_COMMAND: &str = "Backup";

/// Reply when the target message holds nothing worth backing up.
const NO_ATTACHMENTS_STATUS: &str = "no attachments detected";

/// Discord bot handler
///
/// Only authorization and target resolution live here; moving bytes
/// around is delegated to the [`Transferrer`].
pub struct Bot {
    authorized_user_ids: HashSet<u64>,
    transferrer: Arc<dyn Transferrer>,
}

impl Bot {
    pub fn new(authorized_user_ids: HashSet<u64>, transferrer: Arc<dyn Transferrer>) -> Self {
        Self {
            authorized_user_ids,
            transferrer,
        }
    }

    fn is_authorized(&self, user_id: u64) -> bool {
        self.authorized_user_ids.contains(&user_id)
    }

    async fn handle_backup(&self, ctx: &Context, command: &CommandInteraction) {
        // Acknowledge right away; transfers can easily outlast
        // Discord's three-second response window.
        let ack = CreateInteractionResponse::Defer(
            CreateInteractionResponseMessage::new().ephemeral(true),
        );
        if let Err(e) = command.create_response(&ctx.http, ack).await {
            error!("Failed to acknowledge interaction: {}", e);
            return;
        }

        // Unauthorized users get no reply at all, not even a refusal.
        if !self.is_authorized(command.user.id.get()) {
            info!("Backup requested by unauthorized user {}", command.user.name);
            return;
        }

        let Some(statuses) = self.backup_statuses(command).await else {
            return;
        };

        let followup = CreateInteractionResponseFollowup::new()
            .content(statuses)
            .ephemeral(true);
        if let Err(e) = command.create_followup(&ctx.http, followup).await {
            error!("Failed to send backup summary: {}", e);
        }
    }

    /// Resolve the target message and transfer its media attachments.
    ///
    /// `None` means the interaction payload was malformed and no reply
    /// should be attempted.
    async fn backup_statuses(&self, command: &CommandInteraction) -> Option<String> {
        let Some(target_id) = command.data.target_id else {
            error!("Backup interaction carries no target message");
            return None;
        };
        let message_id = target_id.to_message_id();

        let Some(message) = command.data.resolved.messages.get(&message_id) else {
            error!("Target message {} missing from resolved data", message_id);
            return None;
        };

        let Some(message_time) = snowflake::message_timestamp(message.id.get()) else {
            error!("Message ID {} does not decode to a timestamp", message.id);
            return Some("internal error".to_string());
        };

        let candidates: Vec<MediaCandidate> = message
            .attachments
            .iter()
            .map(|a| MediaCandidate {
                filename: &a.filename,
                url: &a.url,
                content_type: a.content_type.as_deref(),
            })
            .collect();

        Some(collect_statuses(self.transferrer.as_ref(), &candidates, message_time).await)
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn interaction_create(
        &self,
        ctx: Context,
        interaction: serenity::model::application::Interaction,
    ) {
        if let Some(command) = interaction.as_command() {
            match command.data.name.as_str() {
                BACKUP_COMMAND => self.handle_backup(&ctx, command).await,
                _ => {}
            }
        }
    }

    /// Bot is ready - register the context menu command
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);

        let commands = vec![CreateCommand::new(BACKUP_COMMAND).kind(CommandType::Message)];

        if let Err(e) = Command::set_global_commands(&ctx.http, commands).await {
            error!("Failed to register context menu command: {}", e);
        }
    }
}

/// The slice of an attachment the backup flow cares about.
struct MediaCandidate<'a> {
    filename: &'a str,
    url: &'a str,
    content_type: Option<&'a str>,
}

/// Run every qualifying attachment through the transferrer, in message
/// order, and concatenate the status lines. Falls back to a fixed
/// notice when nothing qualified so the reply is never empty.
async fn collect_statuses(
    transferrer: &dyn Transferrer,
    attachments: &[MediaCandidate<'_>],
    message_time: DateTime<Utc>,
) -> String {
    let mut statuses = String::new();

    for attachment in attachments {
        if !is_media_content_type(attachment.content_type) {
            continue;
        }
        statuses.push_str(
            &transferrer
                .transfer(attachment.filename, attachment.url, message_time)
                .await,
        );
    }

    if statuses.is_empty() {
        info!("No attachments detected");
        statuses.push_str(NO_ATTACHMENTS_STATUS);
    }

    statuses
}

/// Attachments only qualify when Discord reports them as images or
/// videos. Case-sensitive prefix match on the MIME type; attachments
/// without a reported type are skipped.
fn is_media_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        Some(ct) => ct.starts_with("image/") || ct.starts_with("video/"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingTransferrer {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingTransferrer {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transferrer for RecordingTransferrer {
        async fn transfer(
            &self,
            filename: &str,
            _source_url: &str,
            _message_time: DateTime<Utc>,
        ) -> String {
            self.calls.lock().unwrap().push(filename.to_string());
            format!("{}: created\n", filename)
        }
    }

    struct FlakyTransferrer;

    #[async_trait]
    impl Transferrer for FlakyTransferrer {
        async fn transfer(
            &self,
            filename: &str,
            _source_url: &str,
            _message_time: DateTime<Utc>,
        ) -> String {
            if filename.ends_with(".mp4") {
                format!("{}: internal error\n", filename)
            } else {
                format!("{}: created\n", filename)
            }
        }
    }

    fn candidate(
        filename: &'static str,
        content_type: Option<&'static str>,
    ) -> MediaCandidate<'static> {
        MediaCandidate {
            filename,
            url: "http://cdn.test/file",
            content_type,
        }
    }

    fn message_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_462_015_105, 0).unwrap()
    }

    #[tokio::test]
    async fn test_only_media_attachments_are_transferred() {
        let transferrer = RecordingTransferrer::new();
        let attachments = [
            candidate("a1.png", Some("image/png")),
            candidate("a2.txt", Some("text/plain")),
            candidate("a3.mp4", Some("video/mp4")),
        ];

        let statuses = collect_statuses(&transferrer, &attachments, message_time()).await;

        assert_eq!(statuses, "a1.png: created\na3.mp4: created\n");
        assert_eq!(*transferrer.calls.lock().unwrap(), vec!["a1.png", "a3.mp4"]);
    }

    #[tokio::test]
    async fn test_transfers_run_in_message_order() {
        let transferrer = RecordingTransferrer::new();
        let attachments = [
            candidate("z.png", Some("image/png")),
            candidate("a.mp4", Some("video/mp4")),
            candidate("m.jpg", Some("image/jpeg")),
        ];

        collect_statuses(&transferrer, &attachments, message_time()).await;

        assert_eq!(
            *transferrer.calls.lock().unwrap(),
            vec!["z.png", "a.mp4", "m.jpg"]
        );
    }

    #[tokio::test]
    async fn test_no_attachments_yields_fixed_notice() {
        let transferrer = RecordingTransferrer::new();

        let statuses = collect_statuses(&transferrer, &[], message_time()).await;

        assert_eq!(statuses, "no attachments detected");
        assert!(transferrer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_media_attachments_yield_fixed_notice() {
        let transferrer = RecordingTransferrer::new();
        let attachments = [
            candidate("notes.txt", Some("text/plain")),
            candidate("mystery.bin", None),
        ];

        let statuses = collect_statuses(&transferrer, &attachments, message_time()).await;

        assert_eq!(statuses, "no attachments detected");
        assert!(transferrer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_transfers_still_contribute_status_lines() {
        let attachments = [
            candidate("a.png", Some("image/png")),
            candidate("b.mp4", Some("video/mp4")),
        ];

        let statuses = collect_statuses(&FlakyTransferrer, &attachments, message_time()).await;

        assert_eq!(statuses, "a.png: created\nb.mp4: internal error\n");
    }

    #[test]
    fn test_media_prefix_match_is_case_sensitive() {
        assert!(is_media_content_type(Some("image/png")));
        assert!(is_media_content_type(Some("video/mp4")));
        assert!(!is_media_content_type(Some("Image/png")));
        assert!(!is_media_content_type(Some("IMAGE/PNG")));
        assert!(!is_media_content_type(Some("text/plain")));
        assert!(!is_media_content_type(Some("application/octet-stream")));
        assert!(!is_media_content_type(None));
    }

    #[test]
    fn test_authorization_is_an_exact_id_match() {
        let bot = Bot::new(
            HashSet::from([42, 7]),
            Arc::new(RecordingTransferrer::new()),
        );

        assert!(bot.is_authorized(42));
        assert!(bot.is_authorized(7));
        assert!(!bot.is_authorized(43));
    }
}
