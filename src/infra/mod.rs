pub mod chat;
pub mod retry;
