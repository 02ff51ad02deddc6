//! Outbound mail. Delivery is a black box behind [`Mailer`]; templates are
//! plain functions returning subject and HTML body.

pub mod templates;
pub mod transport;

pub use transport::{LogMailer, MailError, Mailer, OutgoingMail, SmtpConfig, SmtpMailer};
