// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not enough resources to schedule capability bundle")]
    NotEnoughResources,

    #[error("unknown handler: {0}")]
    UnknownHandler(String),

    #[error("store error: {0}")]
    Store(#[from] silo_store::StoreError),

    #[error("adapter error: {0}")]
    Adapter(#[from] silo_adapters::AdapterError),
}
