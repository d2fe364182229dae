pub mod asset;
pub mod discord;
pub mod snowflake;
pub mod transfer;

pub use asset::{AssetClient, AssetError, AssetUpload, CurrentUser, PingResponse};
pub use transfer::{TransferPipeline, Transferrer};
