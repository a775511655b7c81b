use futures::Stream;
use tokio::io::AsyncWrite;
use tracing::{debug, info};

use crate::console::Console;
use crate::domain::{AccountRepository, Command, Error, Money};
use crate::store::AccountStore;

const WELCOME: &str = "Welcome to the bank. Please select an option:";
const INVALID_CHOICE: &str = "Invalid choice. Please enter a valid option.";
const ACCOUNT_NOT_FOUND: &str = "Account not found. Please enter a valid account number.";
const INSUFFICIENT_FUNDS: &str = "Insufficient funds. Withdrawal failed.";
const DEPOSIT_TOO_LARGE: &str = "Amount too large. Deposit failed.";
const WITHDRAWAL_TOO_LARGE: &str = "Amount too large. Withdrawal failed.";
const GOODBYE: &str = "Exiting the application. Goodbye!";

/// Menu-driven dispatcher over the account store.
pub struct Engine<S, W, R>
where
    R: AccountRepository,
{
    console: Console<S, W>,
    store: AccountStore<R>,
}

impl<S, W, R> Engine<S, W, R>
where
    S: Stream<Item = Result<String, Error>> + Unpin,
    W: AsyncWrite + Unpin,
    R: AccountRepository,
{
    pub fn new(console: Console<S, W>, store: AccountStore<R>) -> Self {
        Self { console, store }
    }

    /// Runs until Exit is chosen or the input closes. Only console I/O
    /// failures escape.
    pub async fn process(&mut self) -> Result<(), Error> {
        match self.menu_loop().await {
            Err(Error::InputClosed) => {
                info!("Input closed, leaving");
                Ok(())
            }
            other => other,
        }
    }

    async fn menu_loop(&mut self) -> Result<(), Error> {
        loop {
            self.print_menu().await?;
            let choice = self.console.read_choice().await?;

            let command = match Command::try_from(choice) {
                Ok(command) => command,
                Err(e) => {
                    debug!(error = %e, "Rejected menu choice");
                    self.console.say(INVALID_CHOICE).await?;
                    continue;
                }
            };

            debug!(?command, "Dispatching");
            match command {
                Command::CreateAccount => self.create_account().await?,
                Command::CheckBalance => self.check_balance().await?,
                Command::Deposit => self.deposit().await?,
                Command::Withdraw => self.withdraw().await?,
                Command::Exit => {
                    self.console.say(GOODBYE).await?;
                    return Ok(());
                }
            }
        }
    }

    async fn print_menu(&mut self) -> Result<(), Error> {
        self.console.say(WELCOME).await?;
        for command in Command::MENU {
            self.console.say(command.to_string()).await?;
        }
        Ok(())
    }

    async fn create_account(&mut self) -> Result<(), Error> {
        let user_name = self.console.ask("Enter your full name:").await?;
        self.console.say("Enter your initial balance:").await?;
        let initial_balance = self.console.read_amount().await?;

        let account_number = self.store.create(&user_name, initial_balance);
        self.console
            .say(format!(
                "Account created successfully. Your account number is: {}",
                account_number
            ))
            .await
    }

    async fn check_balance(&mut self) -> Result<(), Error> {
        let account_number = self.ask_account_number().await?;
        let message = match self.store.get(&account_number) {
            Some(account) => format!(
                "Balance for account {}: {}",
                account_number,
                Money(account.current_balance)
            ),
            None => ACCOUNT_NOT_FOUND.to_string(),
        };
        self.console.say(message).await
    }

    async fn deposit(&mut self) -> Result<(), Error> {
        let account_number = self.ask_account_number().await?;
        if !self.store.contains(&account_number) {
            return self.console.say(ACCOUNT_NOT_FOUND).await;
        }

        self.console.say("Enter the deposit amount:").await?;
        let amount = self.console.read_amount().await?;

        let message = match self.store.deposit(&account_number, amount) {
            Ok(balance) => format!("Deposit successful. New balance: {}", Money(balance)),
            Err(e @ Error::AmountOverflow { .. }) => {
                debug!(account = %account_number, error = %e, "Deposit rejected");
                DEPOSIT_TOO_LARGE.to_string()
            }
            Err(Error::AccountNotFound(_)) => ACCOUNT_NOT_FOUND.to_string(),
            Err(e) => return Err(e),
        };
        self.console.say(message).await
    }

    async fn withdraw(&mut self) -> Result<(), Error> {
        let account_number = self.ask_account_number().await?;
        if !self.store.contains(&account_number) {
            return self.console.say(ACCOUNT_NOT_FOUND).await;
        }

        self.console.say("Enter the withdrawal amount:").await?;
        let amount = self.console.read_amount().await?;

        let message = match self.store.withdraw(&account_number, amount) {
            Ok(balance) => format!("Withdrawal successful. New balance: {}", Money(balance)),
            Err(Error::InsufficientFunds { balance, requested }) => {
                debug!(account = %account_number, %balance, %requested, "Withdrawal rejected");
                INSUFFICIENT_FUNDS.to_string()
            }
            Err(e @ Error::AmountOverflow { .. }) => {
                debug!(account = %account_number, error = %e, "Withdrawal rejected");
                WITHDRAWAL_TOO_LARGE.to_string()
            }
            Err(Error::AccountNotFound(_)) => ACCOUNT_NOT_FOUND.to_string(),
            Err(e) => return Err(e),
        };
        self.console.say(message).await
    }

    /// Surrounding whitespace is not part of an account number.
    async fn ask_account_number(&mut self) -> Result<String, Error> {
        let line = self.console.ask("Enter your account number:").await?;
        Ok(line.trim().to_owned())
    }

    pub fn into_parts(self) -> (Console<S, W>, AccountStore<R>) {
        (self.console, self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use rust_decimal::Decimal;

    use crate::console::{ConsoleReader, INVALID_INTEGER};
    use crate::domain::LineSource;
    use crate::store::tests::{MemoryRepository, dec, store};

    /// Seeds a store, builds the stdin script from it and runs the loop to
    /// completion.
    async fn run(
        script: impl FnOnce(&mut AccountStore<MemoryRepository>) -> String,
    ) -> (String, AccountStore<MemoryRepository>) {
        let mut s = store(MemoryRepository::default());
        let input = script(&mut s);
        let mut reader = ConsoleReader::new(Cursor::new(input.into_bytes()));
        let console = Console::new(reader.lines(), Vec::new());

        let mut engine = Engine::new(console, s);
        engine.process().await.unwrap();
        let (console, s) = engine.into_parts();
        (String::from_utf8(console.into_output()).unwrap(), s)
    }

    #[tokio::test]
    async fn create_reports_new_number() {
        let (out, s) = run(|_| "1\nAda Lovelace\n100.00\n5\n".to_string()).await;
        assert_eq!(s.len(), 1);
        assert!(out.starts_with(WELCOME));
        assert!(out.contains("Enter your full name:"));
        assert!(out.contains("Enter your initial balance:"));
        assert!(out.contains("Account created successfully. Your account number is: "));
        assert!(out.ends_with("Exiting the application. Goodbye!\n"));
    }

    #[tokio::test]
    async fn deposit_then_overdraw_then_drain() {
        let mut number = String::new();
        let (out, s) = run(|s| {
            number = s.create("Ada", dec("100.00"));
            format!(
                "3\n{n}\n50\n4\n{n}\n200\n4\n{n}\n150.00\n2\n{n}\n5\n",
                n = number
            )
        })
        .await;

        assert!(out.contains("Deposit successful. New balance: $150.00"));
        assert!(out.contains(INSUFFICIENT_FUNDS));
        assert!(out.contains("Withdrawal successful. New balance: $0.00"));
        assert!(out.contains(&format!("Balance for account {}: $0.00", number)));

        let a = s.get(&number).unwrap();
        assert_eq!(a.total_deposits, dec("50"));
        assert_eq!(a.total_withdrawals, dec("150.00"));
    }

    #[tokio::test]
    async fn unknown_account_skips_amount_prompt() {
        let (out, _) = run(|_| "3\n999\n4\n999\n2\n999\n5\n".to_string()).await;
        assert_eq!(out.matches(ACCOUNT_NOT_FOUND).count(), 3);
        assert!(!out.contains("Enter the deposit amount:"));
        assert!(!out.contains("Enter the withdrawal amount:"));
    }

    #[tokio::test]
    async fn bad_choices_keep_looping() {
        let (out, _) = run(|_| "x\n9\n5\n".to_string()).await;
        assert!(out.contains(INVALID_INTEGER));
        assert!(out.contains(INVALID_CHOICE));
        assert!(out.contains(GOODBYE));
        assert_eq!(out.matches(WELCOME).count(), 2);
    }

    #[tokio::test]
    async fn closed_input_ends_quietly() {
        let (out, _) = run(|_| "2\n".to_string()).await;
        assert!(out.contains("Enter your account number:"));
        assert!(!out.contains(GOODBYE));
    }

    #[tokio::test]
    async fn overflowing_deposit_is_reported_and_loop_continues() {
        let mut number = String::new();
        let (out, s) = run(|s| {
            number = s.create("Ada", Decimal::MAX);
            format!("3\n{n}\n{max}\n5\n", n = number, max = Decimal::MAX)
        })
        .await;

        assert!(out.contains(DEPOSIT_TOO_LARGE));
        assert!(out.contains(GOODBYE));
        assert_eq!(s.get(&number).unwrap().current_balance, Decimal::MAX);
        assert_eq!(s.get(&number).unwrap().total_deposits, Decimal::ZERO);
    }

    #[tokio::test]
    async fn account_number_is_matched_after_trimming() {
        let mut number = String::new();
        let (out, _) = run(|s| {
            number = s.create("Ada", dec("12.5"));
            format!("2\n  {n}\t\n5\n", n = number)
        })
        .await;

        assert!(out.contains(&format!("Balance for account {}: $12.50", number)));
        assert!(!out.contains(ACCOUNT_NOT_FOUND));
    }
}
