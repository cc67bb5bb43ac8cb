use super::*;
use parking_lot::Mutex;
use std::sync::Arc;

#[tokio::test]
async fn sync_driver_runs_the_future_to_completion() {
    let driver = SyncDriver;
    let ran = Arc::new(Mutex::new(false));
    let ran_clone = ran.clone();
    driver
        .spawn(Box::pin(async move {
            *ran_clone.lock() = true;
        }))
        .await;
    assert!(*ran.lock());
}

#[tokio::test]
async fn tokio_driver_runs_the_future_to_completion() {
    let driver = TokioDriver;
    let ran = Arc::new(Mutex::new(false));
    let ran_clone = ran.clone();
    driver
        .spawn(Box::pin(async move {
            *ran_clone.lock() = true;
        }))
        .await;
    assert!(*ran.lock());
}
