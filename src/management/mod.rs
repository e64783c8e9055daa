mod state;
mod table;
mod token;

pub use state::FileStateStore;
pub use state::MemoryStateStore;
pub use state::STATE_LIFETIME_SECS;
pub use state::StateStore;
pub use table::JsonTable;
pub use token::FileTokenStore;
pub use token::MemoryTokenStore;
pub use token::TokenStore;
