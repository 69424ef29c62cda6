//! Reply texts
//!
//! Everything here is sent with HTML parse mode, so dynamic values go
//! through `escape_html`.

use crate::models::{BroadcastReport, QuotaStats, UserAccount};
use crate::services::{BulkUpdateReport, HostedFile, PurgeReport, UploadReceipt};
use crate::state::PendingInput;
use crate::utils::helpers::{escape_html, format_timestamp};

pub const UPLOAD_PROMPT: &str = "📤 Send me an HTML or ZIP file to host.";
pub const UPLOADING: &str = "⏳ Uploading your file, please wait...";
pub const CANCELLED: &str = "✅ Cancelled.";
pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel.";
pub const NO_FILES: &str = "📂 You have no uploaded files.";
pub const NO_FILES_AT_ALL: &str = "📂 No uploaded files found.";
pub const NO_USERS: &str = "⚠️ No users found.";
pub const BROADCAST_EXPIRED: &str = "⌛ The broadcast request expired. Start again with /broadcast.";
pub const UNSUPPORTED_MESSAGE: &str = "🤔 I did not understand that. Use /help to see what I can do.";

fn usage_line(stats: &QuotaStats) -> String {
    format!("📦 Slots used: {}/{}", stats.file_count, stats.total_slots())
}

pub fn welcome_user(name: &str, stats: &QuotaStats) -> String {
    format!(
        "👋 Welcome to the HTML Hosting Bot, {}!\n\n\
         Send me an HTML page or a ZIP bundle and I will host it for you.\n\
         {}\n\n\
         Use the menu below:",
        escape_html(name),
        usage_line(stats)
    )
}

pub fn welcome_admin(name: &str) -> String {
    format!("👋 Welcome to the Admin Panel, {}! Use the menu below:", escape_html(name))
}

pub fn user_help() -> String {
    "⚙️ <b>Commands</b>\n\
     /upload - Upload a file\n\
     /myfiles - View your uploaded files\n\
     /delete &lt;name&gt; - Delete one of your files\n\
     /refer - Get your referral link\n\
     /cancel - Cancel the current action"
        .to_string()
}

pub fn admin_help() -> String {
    format!(
        "{}\n\n\
         ⚙️ <b>Admin Commands</b>\n\
         /listfiles - List all uploaded files\n\
         /viewusers - View all users\n\
         /banuser &lt;user_id&gt; - Ban a user\n\
         /unbanuser &lt;user_id&gt; - Unban a user\n\
         /deleteuserfiles &lt;user_id&gt; - Delete a user's files\n\
         /setslots &lt;n&gt; - Set the base slot limit for everyone\n\
         /setreward &lt;n&gt; - Set slots granted per referral\n\
         /broadcast - Send a message to all users\n\
         /status - View bot status",
        user_help()
    )
}

/// Prompt sent when an input is armed
pub fn prompt(pending: PendingInput) -> &'static str {
    match pending {
        PendingInput::AwaitingBanTarget => "🚫 Send the user ID to ban.",
        PendingInput::AwaitingUnbanTarget => "🔓 Send the user ID to unban.",
        PendingInput::AwaitingSlotEdit => "🔢 Send the new base slot limit for all users.",
        PendingInput::AwaitingRewardEdit => "🎁 Send the number of slots granted per referral.",
        PendingInput::AwaitingBroadcastPayload => {
            "📢 Send the message you want to broadcast (text, image, or video). /cancel to abort."
        }
        PendingInput::AwaitingDeleteFilename => {
            "🗑 Send the name of the file you want to delete. It must match the file name exactly."
        }
    }
}

pub fn upload_success(receipt: &UploadReceipt) -> String {
    let verb = if receipt.replaced { "replaced" } else { "uploaded" };
    format!(
        "✅ File {} successfully!\n🔗 Link: {}\n{}",
        verb,
        escape_html(&receipt.url),
        usage_line(&receipt.stats)
    )
}

fn file_line(file: &HostedFile, label: &str) -> String {
    format!("🔗 <a href=\"{}\">{}</a>", escape_html(&file.url), escape_html(label))
}

pub fn my_files(files: &[HostedFile], stats: &QuotaStats) -> String {
    let mut text = String::from("📄 Your uploaded files:\n");
    for file in files {
        text.push_str(&file_line(file, &file.name));
        text.push('\n');
    }
    text.push('\n');
    text.push_str(&usage_line(stats));
    text
}

pub fn all_files(files: &[HostedFile]) -> String {
    let mut text = format!("📜 All uploaded files ({}):\n", files.len());
    for file in files {
        text.push_str(&file_line(file, &file.path));
        text.push('\n');
    }
    text
}

pub fn file_deleted(file_name: &str, stats: &QuotaStats) -> String {
    format!("✅ File {} deleted successfully.\n{}", escape_html(file_name), usage_line(stats))
}

pub fn referral_info(link: &str, stats: &QuotaStats) -> String {
    format!(
        "🤝 Invite friends and earn {} extra slot(s) for each one who joins!\n\n\
         🔗 Your link: {}\n\n\
         👥 Referrals: {}\n\
         🎁 Referral slots: {}\n\
         {}",
        stats.referral_reward,
        escape_html(link),
        stats.referral_count(),
        stats.referral_slots(),
        usage_line(stats)
    )
}

pub fn contact(url: &str) -> String {
    format!("📌 Message the owner for any query:\n🔗 {}", escape_html(url))
}

pub fn user_list(users: &[UserAccount]) -> String {
    let mut text = format!("📜 Total Users: {}\n\n", users.len());
    for user in users {
        text.push_str(&format!(
            "👤 Name: {}\n💬 Chat ID: <code>{}</code>\n📦 Slots: {}/{} · joined {}\n\n",
            escape_html(&user.name),
            user.chat_id,
            user.stats.file_count,
            user.stats.total_slots(),
            format_timestamp(user.joined_at)
        ));
    }
    text
}

/// Figures shown by `/status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub total_users: u64,
    pub users_today: u32,
    pub banned_users: usize,
    pub total_files: usize,
    pub default_base_limit: u32,
    pub referral_reward: u32,
}

pub fn status(report: &StatusReport) -> String {
    format!(
        "📊 <b>Bot status</b>\n\
         👥 Total users: {}\n\
         📅 Active today: {}\n\
         🚫 Banned users: {}\n\
         📂 Hosted files: {}\n\
         📦 Default base limit: {}\n\
         🎁 Slots per referral: {}",
        report.total_users,
        report.users_today,
        report.banned_users,
        report.total_files,
        report.default_base_limit,
        report.referral_reward
    )
}

pub fn banned(user_id: i64, newly: bool) -> String {
    if newly {
        format!("✅ User {} has been banned.", user_id)
    } else {
        format!("ℹ️ User {} was already banned.", user_id)
    }
}

pub fn unbanned(user_id: i64, was_banned: bool) -> String {
    if was_banned {
        format!("✅ User {} has been unbanned.", user_id)
    } else {
        format!("ℹ️ User {} was not banned.", user_id)
    }
}

pub fn user_files_deleted(user_id: i64, report: &PurgeReport) -> String {
    let mut text = format!("✅ Deleted {} file(s) of user {}.", report.deleted, user_id);
    if !report.failed.is_empty() {
        text.push_str(&format!(
            "\n⚠️ {} file(s) could not be deleted and still count against the quota: {}",
            report.failed.len(),
            escape_html(&report.failed.join(", "))
        ));
    }
    text
}

pub fn bulk_update(setting: &str, value: u32, report: &BulkUpdateReport) -> String {
    let mut text = format!("✅ {} set to {} for {} user(s).", setting, value, report.updated);
    if !report.failed.is_empty() {
        text.push_str(&format!(
            "\n⚠️ {} account(s) could not be updated; see logs.",
            report.failed.len()
        ));
    }
    text
}

pub fn broadcast_finished(report: &BroadcastReport) -> String {
    let mut text = format!("✅ Broadcast sent to {} users.", report.delivered);
    if !report.failed.is_empty() {
        text.push_str(&format!("\n⚠️ {} delivery(ies) failed.", report.failed.len()));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_line_in_welcome() {
        let mut stats = QuotaStats::new(2, 1);
        stats.apply_delta(1);
        let text = welcome_user("<Ann>", &stats);
        assert!(text.contains("1/2"));
        assert!(text.contains("&lt;Ann&gt;"));
    }

    #[test]
    fn test_broadcast_report_mentions_failures() {
        let report = BroadcastReport {
            total: 5,
            delivered: 3,
            failed: vec![4, 5],
        };
        let text = broadcast_finished(&report);
        assert!(text.contains("sent to 3 users"));
        assert!(text.contains("2 delivery"));
    }

    #[test]
    fn test_file_links_are_escaped() {
        let file = HostedFile {
            path: "uploads/1/a&b.html".to_string(),
            name: "a&b.html".to_string(),
            url: "https://x/o/a?alt=media&token=t".to_string(),
            size: 1,
        };
        let text = my_files(&[file], &QuotaStats::new(2, 1));
        assert!(text.contains("<a href=\"https://x/o/a?alt=media&amp;token=t\">a&amp;b.html</a>"));
    }

    #[test]
    fn test_purge_lists_files_left_behind() {
        let report = PurgeReport {
            deleted: 2,
            failed: vec!["a<b>.html".to_string()],
        };
        let text = user_files_deleted(7, &report);
        assert!(text.contains("Deleted 2 file(s) of user 7"));
        assert!(text.contains("1 file(s) could not be deleted"));
        assert!(text.contains("a&lt;b&gt;.html"));

        let clean = user_files_deleted(7, &PurgeReport { deleted: 1, failed: vec![] });
        assert!(!clean.contains("could not"));
    }
}
