//! Per-update handlers: inline search, chat commands, language callbacks.

use {
    teloxide::{
        payloads::{AnswerCallbackQuerySetters, AnswerInlineQuerySetters, SendMessageSetters},
        prelude::*,
        types::{
            CallbackQuery, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InlineQuery,
            InlineQueryResult, InlineQueryResultArticle, InputMessageContent,
            InputMessageContentText, User,
        },
    },
    tracing::debug,
};

use kinogram_i18n::Locale;

use crate::{
    error::Result,
    render::{RenderedResult, render_outcome},
    state::BotState,
};

/// Callback data prefix for the language menu buttons.
const LANG_CALLBACK_PREFIX: &str = "lang:";

/// Commands older than this are dropped unanswered, so a backlog accumulated
/// while the bot was down does not replay on startup.
const MAX_COMMAND_AGE_SECS: i64 = 300;

/// Answer an inline query with catalog matches rendered in the user's
/// saved language.
pub async fn handle_inline_query(state: &BotState, query: InlineQuery) -> Result<()> {
    debug!(user_id = query.from.id.0, query = %query.query, "inline query");

    let locale = profile_locale(state, &query.from).await?;
    let outcome = state.catalog.search(&query.query).await;
    let batch = render_outcome(&outcome, &query.query, locale, &state.translations);

    let results: Vec<InlineQueryResult> = batch.results.iter().map(to_article).collect();
    state
        .bot
        .answer_inline_query(query.id.clone(), results)
        .cache_time(batch.cache_seconds)
        .await?;
    Ok(())
}

/// Handle a chat message. Only slash commands are acted on; everything else
/// is ignored since search happens through inline mode.
pub async fn handle_message(state: &BotState, msg: Message) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(command) = parse_command(text, state.bot_username.as_deref()) else {
        return Ok(());
    };

    if is_stale(msg.date.timestamp(), unix_now()) {
        debug!(chat_id = msg.chat.id.0, command, "dropping stale command");
        return Ok(());
    }

    let locale = match msg.from.as_ref() {
        Some(user) => profile_locale(state, user).await?,
        None => Locale::default(),
    };

    match command {
        "start" | "help" => send_help(state, msg.chat.id, locale).await,
        "language" => send_language_menu(state, msg.chat.id, locale).await,
        _ => {
            debug!(command, "unknown command");
            Ok(())
        },
    }
}

/// Handle a button press. Only `lang:<code>` selections are recognized;
/// anything else just gets its spinner dismissed.
pub async fn handle_callback_query(state: &BotState, query: CallbackQuery) -> Result<()> {
    let chosen = query
        .data
        .as_deref()
        .and_then(|data| data.strip_prefix(LANG_CALLBACK_PREFIX))
        .and_then(Locale::from_code);
    let Some(locale) = chosen else {
        let _ = state.bot.answer_callback_query(&query.id).await;
        return Ok(());
    };

    let user_id = query.from.id.0 as i64;
    let fallback = Locale::resolve(query.from.language_code.as_deref());
    state.store.find_or_create(user_id, fallback).await?;
    state.store.set_language(user_id, locale).await?;
    debug!(user_id, language = locale.code(), "language saved");

    let confirmation = state.translations.get(locale, "language.saved");
    let _ = state
        .bot
        .answer_callback_query(&query.id)
        .text(confirmation)
        .await;

    // Confirm in the chat as well, since the toast is easy to miss.
    if let Some(chat_id) = query.message.as_ref().map(|m| m.chat().id) {
        state.bot.send_message(chat_id, confirmation).await?;
    }
    Ok(())
}

/// Load the stored profile for a user, creating one seeded from their client
/// language hint on first contact.
async fn profile_locale(state: &BotState, user: &User) -> Result<Locale> {
    let hint = Locale::resolve(user.language_code.as_deref());
    let profile = state.store.find_or_create(user.id.0 as i64, hint).await?;
    Ok(profile.language)
}

async fn send_help(state: &BotState, chat_id: ChatId, locale: Locale) -> Result<()> {
    let bot_name = state.bot_username.as_deref().unwrap_or("bot");
    let text = state.translations.format(locale, "help", &[("bot", bot_name)]);
    state.bot.send_message(chat_id, text).await?;
    Ok(())
}

async fn send_language_menu(state: &BotState, chat_id: ChatId, locale: Locale) -> Result<()> {
    let rows: Vec<Vec<InlineKeyboardButton>> = Locale::ALL
        .iter()
        .map(|option| {
            vec![InlineKeyboardButton::callback(
                option.native_name(),
                format!("{LANG_CALLBACK_PREFIX}{}", option.code()),
            )]
        })
        .collect();
    let prompt = state.translations.get(locale, "language.prompt");
    state
        .bot
        .send_message(chat_id, prompt)
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

fn to_article(item: &RenderedResult) -> InlineQueryResult {
    let content = InputMessageContent::Text(InputMessageContentText::new(item.body_text.clone()));
    let mut article =
        InlineQueryResultArticle::new(item.id.clone(), item.title.clone(), content)
            .description(item.description.clone());
    if let Some(thumbnail) = item
        .thumbnail_url
        .as_deref()
        .and_then(|raw| reqwest::Url::parse(raw).ok())
    {
        article = article.thumbnail_url(thumbnail);
    }
    InlineQueryResult::Article(article)
}

/// Extract a command name from message text, honoring `/cmd@botname`
/// addressing so group chats don't trigger every bot at once.
fn parse_command<'a>(text: &'a str, bot_username: Option<&str>) -> Option<&'a str> {
    let first = text.split_whitespace().next()?;
    let command = first.strip_prefix('/')?;
    match command.split_once('@') {
        Some((name, target)) => {
            let ours = bot_username.is_some_and(|username| target.eq_ignore_ascii_case(username));
            ours.then_some(name)
        },
        None => Some(command),
    }
}

fn is_stale(message_ts: i64, now_ts: i64) -> bool {
    now_ts.saturating_sub(message_ts) > MAX_COMMAND_AGE_SECS
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
