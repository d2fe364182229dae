mod client;

pub use client::{AssetClient, AssetError, AssetUpload, CurrentUser, PingResponse};
