//! Inline menus

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub fn user_menu(has_contact: bool) -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![InlineKeyboardButton::callback("📤 Upload File", "user:upload")],
        vec![InlineKeyboardButton::callback("📂 My Files", "user:myfiles")],
        vec![InlineKeyboardButton::callback("❌ Delete File", "user:delete")],
        vec![InlineKeyboardButton::callback("🤝 Refer Friends", "user:refer")],
    ];
    if has_contact {
        rows.push(vec![InlineKeyboardButton::callback("📞 Contact", "user:contact")]);
    }
    InlineKeyboardMarkup::new(rows)
}

pub fn admin_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("📂 View All Files", "admin:files")],
        vec![
            InlineKeyboardButton::callback("👥 Users", "admin:users"),
            InlineKeyboardButton::callback("📊 Status", "admin:status"),
        ],
        vec![InlineKeyboardButton::callback("📢 Broadcast Message", "admin:broadcast")],
        vec![
            InlineKeyboardButton::callback("🚫 Ban User", "admin:ban"),
            InlineKeyboardButton::callback("🔓 Unban User", "admin:unban"),
        ],
        vec![
            InlineKeyboardButton::callback("🔢 Set Slots", "admin:slots"),
            InlineKeyboardButton::callback("🎁 Set Reward", "admin:reward"),
        ],
    ])
}
