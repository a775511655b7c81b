use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::domain::{Account, AccountField, AccountRepository, Error};

/// Account numbers are drawn uniformly from `0..ACCOUNT_NUMBER_SPACE`.
const ACCOUNT_NUMBER_SPACE: u32 = 1_000_000;

/// In-memory accounts kept in step with the repository.
///
/// Mutations are applied in memory first and then written back one field at a
/// time. A failed write is logged and otherwise ignored, so memory and storage
/// can drift apart when the database misbehaves.
#[derive(Debug)]
pub struct AccountStore<R>
where
    R: AccountRepository,
{
    accounts: HashMap<String, Account>,
    repository: R,
    rng: StdRng,
}

impl<R> AccountStore<R>
where
    R: AccountRepository,
{
    pub fn new(repository: R) -> Self {
        Self::with_rng(repository, StdRng::from_entropy())
    }

    pub fn with_rng(repository: R, rng: StdRng) -> Self {
        Self {
            accounts: HashMap::new(),
            repository,
            rng,
        }
    }

    /// Loads every persisted account. Returns how many accounts are held
    /// afterwards; a storage failure leaves the store empty.
    pub fn hydrate(&mut self) -> usize {
        match self.repository.load_accounts() {
            Ok(accounts) => {
                for account in accounts {
                    let number = account.account_number.clone();
                    if self.accounts.insert(number.clone(), account).is_some() {
                        warn!(account = %number, "Duplicate account number in storage, keeping the last row");
                    }
                }
                info!(accounts = self.accounts.len(), "Hydrated account store");
            }
            Err(e) => error!(error = %e, "Failed to hydrate accounts, starting empty"),
        }

        self.accounts.len()
    }

    pub fn create(&mut self, user_name: &str, initial_balance: Decimal) -> String {
        let account_number = self.generate_account_number();

        if let Err(e) =
            self.repository
                .insert_account(user_name, &account_number, initial_balance)
        {
            error!(account = %account_number, error = %e, "Failed to persist new account");
        }

        let account = Account::new(
            account_number.clone(),
            user_name.to_owned(),
            initial_balance,
        );
        self.accounts.insert(account_number.clone(), account);
        debug!(account = %account_number, balance = %initial_balance, "Created account");

        account_number
    }

    pub fn get(&self, account_number: &str) -> Option<&Account> {
        self.accounts.get(account_number)
    }

    pub fn contains(&self, account_number: &str) -> bool {
        self.accounts.contains_key(account_number)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Returns the new balance. A deposit that would overflow is rejected
    /// before anything is touched.
    pub fn deposit(&mut self, account_number: &str, amount: Decimal) -> Result<Decimal, Error> {
        let (total_deposits, balance) = {
            let account = self
                .accounts
                .get_mut(account_number)
                .ok_or_else(|| Error::AccountNotFound(account_number.to_owned()))?;
            account.deposit(amount)?;
            (account.total_deposits, account.current_balance)
        };

        self.persist(account_number, AccountField::TotalDeposits, total_deposits);
        self.persist(account_number, AccountField::CurrentBalance, balance);
        debug!(account = %account_number, %amount, %balance, "Deposit applied");

        Ok(balance)
    }

    /// Returns the new balance. An insufficient balance rejects the
    /// withdrawal before anything is touched.
    pub fn withdraw(&mut self, account_number: &str, amount: Decimal) -> Result<Decimal, Error> {
        let (total_withdrawals, balance) = {
            let account = self
                .accounts
                .get_mut(account_number)
                .ok_or_else(|| Error::AccountNotFound(account_number.to_owned()))?;
            account.withdraw(amount)?;
            (account.total_withdrawals, account.current_balance)
        };

        self.persist(account_number, AccountField::TotalWithdrawals, total_withdrawals);
        self.persist(account_number, AccountField::CurrentBalance, balance);
        debug!(account = %account_number, %amount, %balance, "Withdrawal applied");

        Ok(balance)
    }

    fn persist(&self, account_number: &str, field: AccountField, value: Decimal) {
        if let Err(e) = self.repository.update_field(account_number, field, value) {
            error!(
                account = %account_number,
                field = field.column(),
                %value,
                error = %e,
                "Failed to persist account field"
            );
        }
    }

    /// Draws until the number is not already held in memory. Rows that were
    /// never hydrated are not consulted.
    fn generate_account_number(&mut self) -> String {
        loop {
            let candidate = self.rng.gen_range(0..ACCOUNT_NUMBER_SPACE).to_string();
            if !self.accounts.contains_key(&candidate) {
                return candidate;
            }
            debug!(account = %candidate, "Account number already taken, drawing again");
        }
    }
}
