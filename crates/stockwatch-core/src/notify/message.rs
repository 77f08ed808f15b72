//! Notification text

use crate::error::Error;
use crate::model::{Availability, Sku};

/// Message for an availability transition
///
/// `mention` is appended only to "available" messages; `None` (or an empty
/// token) leaves no trace in the text.
pub fn status_message(
    sku: &Sku,
    product: &str,
    availability: Availability,
    mention: Option<&str>,
) -> String {
    match availability {
        Availability::Available => {
            let ping = mention
                .filter(|m| !m.is_empty())
                .map(|m| format!(" <@&{}>", m))
                .unwrap_or_default();
            format!(
                "refurbished {}GB {} {} available{}",
                sku.display_size,
                sku.display_type(),
                product,
                ping
            )
        }
        Availability::Unavailable => format!(
            "refurbished {}GB {} {} not available",
            sku.display_size,
            sku.display_type(),
            product
        ),
    }
}

/// Message for a failed inventory check
pub fn error_message(sku: &Sku, product: &str, error: &Error) -> String {
    format!(
        "error checking {}GB {} {}: {}",
        sku.display_size,
        sku.display_type(),
        product,
        error
    )
}
