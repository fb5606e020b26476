mod client;
mod models;
mod rpc;

pub use client::TicketGateway;
pub use models::TicketResult;
