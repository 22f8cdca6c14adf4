// core/src/core/context.rs

//! The boxed handler type stored per step phase.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// An asynchronous step handler.
///
/// Receives a clone of the run's `ContextData<TData>` and resolves to a
/// [`PipelineControl`] or the pipeline's error type.
///
/// Lock guards taken on the context are blocking `parking_lot` guards and
/// must be dropped before the handler awaits anything.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;
