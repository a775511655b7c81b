use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("Storage failed with: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Decimal, requested: Decimal },

    #[error("Amount {amount} would overflow balance {balance}")]
    AmountOverflow { balance: Decimal, amount: Decimal },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input stream closed")]
    InputClosed,
}
