// core/src/lib.rs

//! stepflow: an async, named-step workflow engine.
//!
//! A [`Pipeline`] is an ordered list of named steps. Each step carries
//! `before`/`on`/`after` handlers that operate on shared [`ContextData`].
//! Handlers either continue, stop the run early, or fail it; a failure
//! aborts the remaining steps, which is what multi-step processes without a
//! transactional commit (sagas) need.
//!
//! Runs can also be resumed at a named step with [`Pipeline::run_from`], so
//! idempotent tail steps can be retried on their own once the context has
//! been rebuilt. The [`Registry`] dispatches runs by context type.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Registry;
