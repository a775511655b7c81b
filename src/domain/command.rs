use crate::domain::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CreateAccount,
    CheckBalance,
    Deposit,
    Withdraw,
    Exit,
}

impl Command {
    /// Menu entries in the order they are printed.
    pub const MENU: [Command; 5] = [
        Command::CreateAccount,
        Command::CheckBalance,
        Command::Deposit,
        Command::Withdraw,
        Command::Exit,
    ];

    pub fn number(&self) -> i64 {
        match self {
            Command::CreateAccount => 1,
            Command::CheckBalance => 2,
            Command::Deposit => 3,
            Command::Withdraw => 4,
            Command::Exit => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Command::CreateAccount => "Create Account",
            Command::CheckBalance => "Check Balance",
            Command::Deposit => "Deposit Money",
            Command::Withdraw => "Withdraw Money",
            Command::Exit => "Exit",
        }
    }
}

impl TryFrom<i64> for Command {
    type Error = Error;

    fn try_from(choice: i64) -> Result<Self, Self::Error> {
        Self::MENU
            .into_iter()
            .find(|command| command.number() == choice)
            .ok_or_else(|| Error::InvalidInput(format!("Invalid menu choice: {}", choice)))
    }
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}. {}", self.number(), self.label())
    }
}
