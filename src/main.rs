//! PageDrop Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::utils::command::BotCommands;
use teloxide::{prelude::*, types::{CallbackQuery, ChatId, Message, Update}};
use tracing::{debug, info, warn};

use PageDrop::{
    config::Settings,
    database::DatabaseService,
    handlers::{handle_callback_query, handle_command, handle_message, report_error, Command},
    services::{ServiceFactory, TelegramSender},
    state::StateStorage,
    storage,
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", PageDrop::info());

    let database = DatabaseService::connect(&settings.database).await?;
    let object_storage = storage::connect(&settings.storage)?;
    info!(provider = object_storage.provider_type(), bucket = %settings.storage.bucket, "Object storage ready");

    let state_storage = StateStorage::connect(&settings).await?;

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);
    let bot_username = match &settings.bot.username {
        Some(username) => username.trim_start_matches('@').to_string(),
        None => bot.get_me().await?.username().to_string(),
    };
    info!(bot_username = %bot_username, "Bot identity resolved");

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register the command list");
    }

    let sender = Arc::new(TelegramSender::new(bot.clone()));
    let services = ServiceFactory::new(&settings, database, object_storage, sender, bot_username);

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![Arc::new(services), Arc::new(state_storage)])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.kind);
        })
        .enable_ctrlc_handler()
        .build();

    info!("PageDrop bot is ready! Starting polling...");
    dispatcher.dispatch().await;

    info!("PageDrop bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(handle_commands))
                .branch(dptree::endpoint(handle_messages)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
}

fn sender_id(msg: &Message) -> i64 {
    msg.from.as_ref().map(|user| user.id.0 as i64).unwrap_or(msg.chat.id.0)
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: Command,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    let user_id = sender_id(&msg);

    if let Err(e) = handle_command(bot.clone(), msg, cmd, (*services).clone(), (*state_storage).clone()).await {
        report_error(&bot, chat_id, user_id, &e).await;
    }
    Ok(())
}

/// Handle regular messages
async fn handle_messages(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    let user_id = sender_id(&msg);

    if let Err(e) = handle_message(bot.clone(), msg, (*services).clone(), (*state_storage).clone()).await {
        report_error(&bot, chat_id, user_id, &e).await;
    }
    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: CallbackQuery,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
) -> HandlerResult {
    let user_id = query.from.id.0 as i64;
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(user_id));

    if let Err(e) = handle_callback_query(bot.clone(), query, (*services).clone(), (*state_storage).clone()).await {
        report_error(&bot, chat_id, user_id, &e).await;
    }
    Ok(())
}
