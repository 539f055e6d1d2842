//! Common assertions for ferry testing

use crate::{Call, RecordingSink, ScriptedTransfer};
use ferry_core::{Error, SessionEvent};

/// Asserts that an operation failed with a not-found transfer error
pub fn assert_not_found<T: std::fmt::Debug>(result: ferry_core::Result<T>) {
    match result {
        Err(err @ Error::Transfer(_)) => assert!(
            err.is_not_found(),
            "Expected a not-found transfer error, got {:?}",
            err
        ),
        other => panic!("Expected a transfer error, got {:?}", other),
    }
}

/// Asserts that an operation failed with any transfer error
pub fn assert_transfer_error<T: std::fmt::Debug>(result: ferry_core::Result<T>) {
    assert!(
        matches!(result, Err(Error::Transfer(_))),
        "Expected a transfer error, got {:?}",
        result
    );
}

/// Asserts that the client saw no operation besides `connect`
pub fn assert_no_operations(client: &ScriptedTransfer) {
    let calls = client.operation_calls();
    assert!(calls.is_empty(), "Unexpected operations before readiness: {:?}", calls);
}

/// Asserts the exact operation sequence seen by the client
pub fn assert_operations(client: &ScriptedTransfer, expected: &[Call]) {
    assert_eq!(client.operation_calls(), expected, "Operation sequence mismatch");
}

/// Asserts the exact diagnostic events recorded by the sink
pub fn assert_events(sink: &RecordingSink, expected: &[SessionEvent]) {
    assert_eq!(sink.events(), expected, "Diagnostic events mismatch");
}
