pub use commands::{BulkCheckoutCmd, CheckoutCmd, CheckoutLine, NewItemCmd, UpdateItemCmd};
pub use error::EngineError;
pub use items::{Item, ItemStatus};
pub use notify::{LogNotifier, Notifier, NotifyEvent};
pub use ops::{Engine, EngineBuilder, TransactionListFilter};
pub use transactions::{Transaction, TransactionKind, TransactionStatus};
pub use users::{Permission, UserRole};

mod commands;
mod error;
mod items;
mod notify;
mod ops;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
