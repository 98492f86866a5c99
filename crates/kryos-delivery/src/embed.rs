//! Discord-style webhook messages built from validated payloads.

use chrono::{DateTime, SecondsFormat, Utc};
use kryos_core::{AuthScheme, BrainrotPayload, LogsPayload, Tier};
use serde::Serialize;

/// Embed color for execution logs.
pub const LOGS_COLOR: u32 = 0x1A_BC_9C;

/// Embed color for security alerts.
pub const ALERT_COLOR: u32 = 0xE7_4C_3C;

/// Body posted to a webhook destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookMessage {
    /// Rich embeds; always exactly one here.
    pub embeds: Vec<Embed>,
}

impl WebhookMessage {
    /// Wraps a single embed.
    pub fn single(embed: Embed) -> Self {
        Self { embeds: vec![embed] }
    }
}

/// A rich embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    /// Embed title.
    pub title: String,
    /// Optional body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sidebar color as 0xRRGGBB.
    pub color: u32,
    /// ISO-8601 time shown under the embed.
    pub timestamp: String,
    /// Optional author line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    /// Optional thumbnail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
    /// Name/value fields, in display order.
    pub fields: Vec<EmbedField>,
    /// Optional footer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

/// Author line of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedAuthor {
    /// Author text.
    pub name: String,
    /// Link on the author text.
    pub url: String,
    /// Small icon left of the author text.
    pub icon_url: String,
}

/// Image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedImage {
    /// Image URL.
    pub url: String,
}

/// A single name/value field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    /// Field label.
    pub name: String,
    /// Field content.
    pub value: String,
    /// Whether the field may share a row.
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self { name: name.to_string(), value: value.into(), inline }
    }
}

/// Footer of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    /// Footer text.
    pub text: String,
    /// Optional footer icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn headshot_url(user_id: &str) -> String {
    format!(
        "https://www.roblox.com/headshot-thumbnail/image?userId={user_id}&width=150&height=150&format=png"
    )
}

/// Execution log notification.
pub fn logs_message(logs: &LogsPayload, at: DateTime<Utc>) -> WebhookMessage {
    let headshot = headshot_url(&logs.user_id);

    WebhookMessage::single(Embed {
        title: "🚀 • Script executed".to_string(),
        description: Some(format!(
            "**{}** executed the script.\n\n> _Thanks for using Kryos Hub_",
            logs.player_name
        )),
        color: LOGS_COLOR,
        timestamp: iso_timestamp(at),
        author: Some(EmbedAuthor {
            name: format!("{} • {}", logs.player_name, logs.display_name),
            url: format!("https://www.roblox.com/users/{}/profile", logs.user_id),
            icon_url: headshot.clone(),
        }),
        thumbnail: Some(EmbedImage { url: headshot.clone() }),
        fields: vec![
            EmbedField::new(
                "🆔 • User",
                format!("```Name: {} | ID: {}```", logs.player_name, logs.user_id),
                false,
            ),
            EmbedField::new("🏷️ • Display name", logs.display_name.as_str(), true),
            EmbedField::new("📅 • Account age", format!("{} days", logs.account_age), true),
            EmbedField::new(
                "🌐 • Place / Server",
                format!("PlaceId: `{}`\nJobId: `{}`", logs.place_id, logs.job_id),
                false,
            ),
            EmbedField::new("👥 • Players", logs.players_count.as_str(), true),
            EmbedField::new("📍 • Position", logs.position.as_str(), true),
            EmbedField::new("⚙️ • Executor", logs.executor.as_str(), true),
        ],
        footer: Some(EmbedFooter { text: "Kryos Hub • Logs".to_string(), icon_url: Some(headshot) }),
    })
}

/// Brainrot notification for the destination of `tier`.
pub fn brainrot_message(brainrot: &BrainrotPayload, tier: Tier, at: DateTime<Utc>) -> WebhookMessage {
    let join_link = format!(
        "https://www.roblox.com/games/start?placeId={}&gameInstanceId={}",
        brainrot.place_id, brainrot.job_id
    );
    let join_script = format!(
        "game:GetService(\"TeleportService\"):TeleportToPlaceInstance({}, \"{}\", game:GetService(\"Players\").LocalPlayer)",
        brainrot.place_id, brainrot.job_id
    );

    WebhookMessage::single(Embed {
        title: format!("💎 | KRYOS NOTIFIER • {}", tier.label().to_uppercase()),
        description: None,
        color: tier.color(),
        timestamp: iso_timestamp(at),
        author: None,
        thumbnail: None,
        fields: vec![
            EmbedField::new("🧠 • Brainrot name", format!("```{}```", brainrot.brainrot_name), true),
            EmbedField::new("⚡ • Generation", format!("```{}```", brainrot.generation), true),
            EmbedField::new("🌐 • Place ID", format!("`{}`", brainrot.place_id), false),
            EmbedField::new("🔑 • Job ID", format!("`{}`", brainrot.job_id), false),
            EmbedField::new("➕ • Quick join", format!("[▶️ Click to join the game]({join_link})"), false),
            EmbedField::new("📋 • Join script (Lua)", format!("```lua\n{join_script}\n```"), false),
        ],
        footer: Some(EmbedFooter { text: "Kryos Notifier".to_string(), icon_url: None }),
    })
}

/// Alert for a request that failed authentication.
///
/// Carries only routing metadata; never the proof that was presented.
pub fn security_alert_message(
    route: &str,
    scheme: AuthScheme,
    request_id: &str,
    at: DateTime<Utc>,
) -> WebhookMessage {
    WebhookMessage::single(Embed {
        title: "🛡️ • Rejected request".to_string(),
        description: Some(format!("A request to `{route}` failed {scheme} authentication.")),
        color: ALERT_COLOR,
        timestamp: iso_timestamp(at),
        author: None,
        thumbnail: None,
        fields: vec![EmbedField::new("Request ID", format!("`{request_id}`"), false)],
        footer: Some(EmbedFooter { text: "Kryos Relay • Security".to_string(), icon_url: None }),
    })
}
