use rust_decimal::Decimal;

use crate::domain::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub account_number: String,
    pub user_name: String,
    pub current_balance: Decimal,   // the reported balance
    pub amount: Decimal,            // moves with current_balance
    pub total_deposits: Decimal,    // cumulative, never decreases
    pub total_withdrawals: Decimal, // cumulative, never decreases
}

impl Account {
    pub fn new(account_number: String, user_name: String, initial_balance: Decimal) -> Self {
        Self {
            account_number,
            user_name,
            current_balance: initial_balance,
            amount: initial_balance,
            total_deposits: Decimal::ZERO,
            total_withdrawals: Decimal::ZERO,
        }
    }

    /// All three sums are checked before any field is written, so an
    /// overflowing deposit leaves the account untouched.
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), Error> {
        let overflow = || Error::AmountOverflow {
            balance: self.current_balance,
            amount,
        };
        let current_balance = self.current_balance.checked_add(amount).ok_or_else(overflow)?;
        let tracked = self.amount.checked_add(amount).ok_or_else(overflow)?;
        let total_deposits = self.total_deposits.checked_add(amount).ok_or_else(overflow)?;

        self.current_balance = current_balance;
        self.amount = tracked;
        self.total_deposits = total_deposits;
        Ok(())
    }

    /// Applies the withdrawal only when the balance covers it; otherwise the
    /// account is left untouched.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), Error> {
        if self.current_balance < amount {
            return Err(Error::InsufficientFunds {
                balance: self.current_balance,
                requested: amount,
            });
        }

        let total_withdrawals = self
            .total_withdrawals
            .checked_add(amount)
            .ok_or(Error::AmountOverflow {
                balance: self.current_balance,
                amount,
            })?;

        self.current_balance -= amount;
        self.amount -= amount;
        self.total_withdrawals = total_withdrawals;
        Ok(())
    }
}
