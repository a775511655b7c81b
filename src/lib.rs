pub mod config;
pub mod console;
pub mod domain;
pub mod engine;
pub mod storage;
pub mod store;

pub use config::Config;
pub use console::{Console, ConsoleReader};
pub use domain::{Account, AccountRepository, Error};
pub use engine::Engine;
pub use storage::SqliteRepository;
pub use store::AccountStore;
