//! Best-effort event notification
//!
//! After selected mutations the contract registers an event for out-of-process
//! listeners. Emission is fire-and-forget: the state change has already been
//! decided, so a failure to register the event is logged and swallowed, never
//! propagated to the caller.

use attest_ledger::TransactionContext;
use tracing::warn;

/// Emits structured notifications through the substrate's event sink.
pub struct EventNotifier;

impl EventNotifier {
    /// Register `(event, payload)` for delivery after commit. Best-effort.
    pub fn emit<C: TransactionContext>(ctx: &mut C, event: &str, payload: serde_json::Value) {
        let bytes = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(event, %err, "event payload not serializable, notification dropped");
                return;
            }
        };
        if let Err(err) = ctx.set_event(event, bytes) {
            warn!(event, %err, "event sink rejected notification, continuing");
        }
    }
}
