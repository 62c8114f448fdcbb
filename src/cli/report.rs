//! Text printed after a failed exchange.

use crate::error::ChatError;

/// Lines describing a failed exchange.
///
/// `notice` is the banner text the controller raised, if it is still
/// showing; otherwise the error's own user message is used. The recovery
/// hint for the error's category follows, then a retry reminder when
/// resending the same prompt makes sense.
pub fn failure_report(err: &ChatError, notice: Option<&str>) -> Vec<String> {
    let message = notice.map_or_else(|| err.user_message(), str::to_string);
    let mut lines = vec![format!("! {}", message), format!("  {}.", err.recovery_hint())];
    if err.is_retryable() {
        lines.push("  (type /retry to edit and resend)".to_string());
    }
    lines
}
