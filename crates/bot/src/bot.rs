//! Bot startup and the long-polling update loop.

use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand, UpdateKind},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use {
    kinogram_catalog::CatalogClient,
    kinogram_config::TelegramConfig,
    kinogram_i18n::Translations,
    kinogram_sequencer::Sequencer,
    kinogram_users::UserStore,
};

use crate::{error::Result, handlers, state::BotState};

/// Connect to Telegram and start polling for updates.
///
/// Spawns a background task that processes updates until the returned
/// `CancellationToken` is cancelled.
pub async fn start_polling(
    config: &TelegramConfig,
    store: UserStore,
    catalog: CatalogClient,
    translations: Arc<Translations>,
) -> Result<CancellationToken> {
    // Build bot with a client timeout longer than the long-polling timeout (30s)
    // so the HTTP client doesn't abort the request before Telegram responds.
    let client = teloxide::net::default_reqwest_settings()
        .timeout(std::time::Duration::from_secs(45))
        .build()?;
    let bot = Bot::with_client(config.token.expose_secret(), client);

    // Verify credentials and get bot username.
    let me = bot.get_me().await?;
    let bot_username = me.username.clone();

    // Delete any existing webhook so long polling works.
    bot.delete_webhook().send().await?;

    // Register slash commands for autocomplete in Telegram clients.
    let commands = vec![
        BotCommand::new("start", "Show how to search for movies"),
        BotCommand::new("help", "Show how to search for movies"),
        BotCommand::new("language", "Choose the interface language"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(username = ?bot_username, "bot connected (webhook cleared)");

    let cancel = CancellationToken::new();
    let state = BotState {
        bot: bot.clone(),
        bot_username,
        store,
        catalog,
        translations,
        sequencer: Sequencer::new(),
        cancel: cancel.clone(),
    };

    let poll_cancel = cancel.clone();
    tokio::spawn(async move {
        info!("starting polling loop");
        let mut offset: i32 = 0;

        loop {
            if poll_cancel.is_cancelled() {
                info!("polling stopped");
                break;
            }

            let result = bot
                .get_updates()
                .offset(offset)
                .timeout(30)
                .allowed_updates(vec![
                    AllowedUpdate::Message,
                    AllowedUpdate::InlineQuery,
                    AllowedUpdate::CallbackQuery,
                ])
                .await;

            match result {
                Ok(updates) => {
                    debug!(count = updates.len(), "got updates");
                    for update in updates {
                        offset = update.id.as_offset();
                        dispatch(&state, update);
                    }
                },
                Err(e) => {
                    // Another instance polling with the same token means this
                    // one must stand down, or both will keep stealing updates.
                    let is_conflict =
                        matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates));
                    if is_conflict {
                        warn!("another instance is already polling with this token, shutting down");
                        poll_cancel.cancel();
                        break;
                    }

                    warn!(error = %e, "getUpdates failed");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                },
            }
        }
    });

    Ok(cancel)
}

/// Queue one update behind its conversation so a chat's events never
/// interleave, while separate chats proceed in parallel.
fn dispatch(state: &BotState, update: Update) {
    let key = conversation_key(&update);
    match update.kind {
        UpdateKind::Message(msg) => {
            debug!(chat_id = msg.chat.id.0, "received message");
            let task_state = state.clone();
            state.sequencer.enqueue(key, async move {
                if let Err(e) = handlers::handle_message(&task_state, msg).await {
                    error!(error = %e, "error handling message");
                }
            });
        },
        UpdateKind::InlineQuery(query) => {
            debug!(user_id = query.from.id.0, "received inline query");
            let task_state = state.clone();
            state.sequencer.enqueue(key, async move {
                if let Err(e) = handlers::handle_inline_query(&task_state, query).await {
                    error!(error = %e, "error handling inline query");
                }
            });
        },
        UpdateKind::CallbackQuery(query) => {
            debug!(callback_data = ?query.data, "received callback query");
            let task_state = state.clone();
            state.sequencer.enqueue(key, async move {
                if let Err(e) = handlers::handle_callback_query(&task_state, query).await {
                    error!(error = %e, "error handling callback query");
                }
            });
        },
        other => {
            debug!("ignoring unsupported update: {other:?}");
        },
    }
}

/// The key updates are sequenced under: the chat for messages, the sender
/// for inline and callback queries without a chat, the update id otherwise.
fn conversation_key(update: &Update) -> String {
    match &update.kind {
        UpdateKind::Message(msg) => msg.chat.id.0.to_string(),
        UpdateKind::CallbackQuery(query) => query
            .message
            .as_ref()
            .map(|m| m.chat().id.0.to_string())
            .unwrap_or_else(|| query.from.id.0.to_string()),
        UpdateKind::InlineQuery(query) => query.from.id.0.to_string(),
        _ => update.id.0.to_string(),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn update(value: serde_json::Value) -> Update {
        // `Update`'s hand-written deserializer needs borrowed string keys,
        // which `from_value` cannot provide; route through text like the
        // real transport does.
        serde_json::from_str(&value.to_string()).expect("deserialize update")
    }

    #[test]
    fn messages_sequence_by_chat() {
        let update = update(json!({
            "update_id": 7,
            "message": {
                "message_id": 1,
                "date": 1,
                "chat": { "id": -100123, "type": "group", "title": "movies" },
                "from": { "id": 1001, "is_bot": false, "first_name": "Alice" },
                "text": "/help"
            }
        }));
        assert_eq!(conversation_key(&update), "-100123");
    }

    #[test]
    fn inline_queries_sequence_by_sender() {
        let update = update(json!({
            "update_id": 8,
            "inline_query": {
                "id": "iq-1",
                "from": { "id": 1001, "is_bot": false, "first_name": "Alice" },
                "query": "matrix",
                "offset": ""
            }
        }));
        assert_eq!(conversation_key(&update), "1001");
    }

    #[test]
    fn callbacks_sequence_by_origin_chat() {
        let update = update(json!({
            "update_id": 9,
            "callback_query": {
                "id": "cb-1",
                "from": { "id": 1001, "is_bot": false, "first_name": "Alice" },
                "chat_instance": "ci-1",
                "message": {
                    "message_id": 7,
                    "date": 1,
                    "chat": { "id": 42, "type": "private", "first_name": "Alice" },
                    "text": "Choose your language"
                },
                "data": "lang:uk"
            }
        }));
        assert_eq!(conversation_key(&update), "42");
    }

    #[test]
    fn callbacks_without_a_message_fall_back_to_the_sender() {
        let update = update(json!({
            "update_id": 10,
            "callback_query": {
                "id": "cb-2",
                "from": { "id": 1001, "is_bot": false, "first_name": "Alice" },
                "chat_instance": "ci-2",
                "data": "lang:uk"
            }
        }));
        assert_eq!(conversation_key(&update), "1001");
    }

    #[test]
    fn unknown_updates_fall_back_to_the_update_id() {
        let update = update(json!({
            "update_id": 11,
            "poll_answer": {
                "poll_id": "p-1",
                "user": { "id": 1001, "is_bot": false, "first_name": "Alice" },
                "option_ids": [0]
            }
        }));
        assert_eq!(conversation_key(&update), "11");
    }
}
