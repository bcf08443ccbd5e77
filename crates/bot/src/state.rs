use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use {
    kinogram_catalog::CatalogClient, kinogram_i18n::Translations, kinogram_sequencer::Sequencer,
    kinogram_users::UserStore,
};

/// Runtime state shared by every handler. Cloning is cheap; all clones
/// share the same pool, client, and queues.
#[derive(Clone)]
pub struct BotState {
    pub bot: teloxide::Bot,
    pub bot_username: Option<String>,
    pub store: UserStore,
    pub catalog: CatalogClient,
    pub translations: Arc<Translations>,
    pub sequencer: Sequencer,
    pub cancel: CancellationToken,
}
