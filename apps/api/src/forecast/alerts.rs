//! Shortage alert message templates. Deterministic text only; delivery
//! belongs to the notifier.

use crate::forecast::AlertKind;

/// Formats the shortage alert for one asset type.
pub fn shortage_alert(
    kind: AlertKind,
    asset_name: &str,
    required: u32,
    available: u32,
    shortage: u32,
) -> String {
    let (title, advice) = match kind {
        AlertKind::SaveHook => (
            "Asset Shortage Alert",
            "Consider creating a material request.",
        ),
        AlertKind::Daily => (
            "Daily Forecast Alert",
            "Consider placing a purchase order soon.",
        ),
    };

    format!(
        "⚠️ *{title}*\n\
         Asset: *{asset_name}*\n\
         Required: {required}\n\
         Available: {available}\n\
         Shortage: {shortage}\n\
         {advice}"
    )
}

/// Appends the draft request confirmation to an already-sent alert message.
pub fn with_request_confirmation(message: &str, request_name: &str) -> String {
    format!("{message}\n✅ Draft MR created: `{request_name}`")
}
