use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Profile(#[from] kinogram_users::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
