//! Notification transport adapters

mod http_sender;
mod tcp_sender;

pub use http_sender::HttpNotificationSender;
pub use tcp_sender::TcpNotificationSender;
