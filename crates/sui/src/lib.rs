// Module declarations
pub mod cap;
pub mod chain;
pub mod effects;
pub mod error;
pub mod interface;
pub mod rpc;

// Re-export commonly used types
pub use cap::find_album_cap;
pub use chain::{derive_address_from_secret_key, load_sender_from_env, resolve_rpc_url};
pub use effects::{AlbumCreation, CreatedObject, TxStatus};
pub use error::{Result, SuiInterfaceError};
pub use interface::{MoveCall, SuiInterface, TxResponse};
pub use rpc::SuiRpcClient;
