use thiserror::Error;

#[derive(Error, Debug)]
pub enum FireSyncError {
    #[error("Invalid weapon record '{record}': {reason}")]
    Data { record: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Unknown weapon: {0}")]
    UnknownWeapon(String),

    #[error("Weapon '{weapon}' is not offered in round {round}")]
    NotOffered { weapon: String, round: u32 },

    #[error("Insufficient funds for '{item}': costs ${price}, balance ${balance}")]
    InsufficientFunds { item: String, price: u32, balance: u32 },

    #[error("Unknown modifier: {0}")]
    UnknownModifier(String),

    #[error("Attachment already owned: {0}")]
    AlreadyOwned(String),

    #[error("Game already finished after {0} rounds")]
    GameFinished(u32),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FireSyncError>;
