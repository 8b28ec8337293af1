pub mod contact;
pub mod health;
pub mod rpc;
