use futures::Stream;
use rust_decimal::Decimal;

use crate::domain::{Account, Error};

/// Source of console lines, one item per line typed by the user.
pub trait LineSource {
    type Lines: Stream<Item = Result<String, Error>> + Send + Unpin + 'static;
    fn lines(&mut self) -> Self::Lines;
}

/// Per-field counters and balances that are written back independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    CurrentBalance,
    TotalDeposits,
    TotalWithdrawals,
}

impl AccountField {
    pub fn column(&self) -> &'static str {
        match self {
            AccountField::CurrentBalance => "current_balance",
            AccountField::TotalDeposits => "total_deposits",
            AccountField::TotalWithdrawals => "total_withdrawals",
        }
    }
}

/// Persistence behind the account store. Every call stands alone: there is
/// no transaction spanning two calls.
pub trait AccountRepository {
    fn load_accounts(&self) -> Result<Vec<Account>, Error>;

    fn insert_account(
        &self,
        user_name: &str,
        account_number: &str,
        initial_balance: Decimal,
    ) -> Result<(), Error>;

    fn update_field(
        &self,
        account_number: &str,
        field: AccountField,
        value: Decimal,
    ) -> Result<(), Error>;
}
