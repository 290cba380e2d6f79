pub mod material;
pub mod request;
