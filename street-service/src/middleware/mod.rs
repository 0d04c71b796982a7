pub mod client_ip;
pub mod login_token;

pub use client_ip::ClientIp;
pub use login_token::LoginToken;
