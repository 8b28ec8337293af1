pub mod chroma;
pub mod mail_relay;
pub mod stripe;
