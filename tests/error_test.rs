use std::time::Duration;

use rpc_cachetools::{CachetoolsError, Result};

#[test]
fn test_error_display() {
    let err = CachetoolsError::remote("get_user", "connection refused");
    let msg = err.to_string();
    assert!(msg.contains("get_user"));
    assert!(msg.contains("connection refused"));
}

#[test]
fn test_method_not_found_display() {
    let err = CachetoolsError::MethodNotFound("svc.missing".to_string());
    assert!(err.to_string().contains("svc.missing"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(CachetoolsError::Configuration("bad".into()))
    }
    assert!(returns_error().is_err());
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn timeout_classification() {
    let err = CachetoolsError::Timeout(Duration::from_secs(1));
    assert!(err.is_timeout());
    assert!(!err.is_remote());
    assert!(err.to_string().contains("1s"));
}

#[test]
fn remote_classification() {
    assert!(CachetoolsError::remote("m", "boom").is_remote());
    assert!(CachetoolsError::MethodNotFound("svc.m".into()).is_remote());
    assert!(!CachetoolsError::TaskFailed("panic".into()).is_remote());
    assert!(!CachetoolsError::Configuration("bad".into()).is_remote());
}

#[test]
fn json_error_converts() {
    let err: CachetoolsError = serde_json::from_str::<u32>("\"nope\"").unwrap_err().into();
    assert!(matches!(err, CachetoolsError::Json(_)));
    assert!(!err.is_remote());
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn join_error_converts_to_task_failed() {
    let handle = tokio::spawn(async { panic!("remote task exploded") });
    let join_err = handle.await.unwrap_err();

    let err: CachetoolsError = join_err.into();
    assert!(matches!(err, CachetoolsError::TaskFailed(_)));
}
