//! External messaging handoff.
//!
//! The order summary is pre-filled into a WhatsApp deep link. Opening the
//! link is fire-and-forget: nothing comes back to tell us it was sent.

use std::fmt::Write as _;
use thiserror::Error;
use crate::domain::aggregates::OrderDraft;
use crate::domain::value_objects::format_brl;

const WHATSAPP_BASE: &str = "https://wa.me/";

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("no handler could open {uri}: {reason}")]
    Unavailable { uri: String, reason: String },
}

pub trait ExternalChannel: Send {
    fn open(&self, uri: &str) -> Result<(), ChannelError>;
}

/// Human-readable summary, lines in cart order.
pub fn compose_order_summary(draft: &OrderDraft) -> String {
    let mut message = String::from("*New order*\n\n");
    let _ = writeln!(message, "Customer: {}", draft.customer_name);
    let _ = writeln!(message, "Email: {}", draft.customer_email);
    message.push_str("\nItems:\n");
    for line in &draft.items {
        let _ = writeln!(message, "- {}x {}: {}", line.quantity, line.name, format_brl(line.line_total()));
    }
    let _ = write!(message, "\nTotal: {}", format_brl(draft.total));
    message
}

/// Builds `https://wa.me/<digits>?text=<message>`. Without a number the
/// link lets the user pick the recipient.
pub fn whatsapp_link(number: Option<&str>, message: &str) -> String {
    let digits: String = number.unwrap_or_default().chars().filter(char::is_ascii_digit).collect();
    format!("{WHATSAPP_BASE}{digits}?text={}", urlencoding::encode(message))
}
