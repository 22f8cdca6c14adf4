// core/src/pipeline/execution.rs

//! `Pipeline::run` and `Pipeline::run_from`.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::StepDef;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// The first handler error aborts the run and is returned unchanged; steps
  /// that already ran keep their side effects.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");
    self.run_steps(0, ctx_data).await
  }

  /// Runs the pipeline starting at `step_name`, skipping every earlier step.
  ///
  /// Callers are responsible for populating whatever the skipped steps would
  /// have put into the context.
  #[instrument(
    name = "Pipeline::run_from",
    skip(self, ctx_data),
    fields(pipeline_context_type = %std::any::type_name::<TData>()),
    err(Display)
  )]
  pub async fn run_from(&self, step_name: &str, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    let start = self.step_position(step_name).ok_or_else(|| {
      Err::from(FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })
    })?;
    event!(Level::DEBUG, start_index = start, "Resuming pipeline.");
    self.run_steps(start, ctx_data).await
  }

  async fn run_steps(&self, start: usize, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    for (step_idx, step_def) in self.steps.iter().enumerate().skip(start) {
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );

      let control = self.run_step(step_def, ctx_data.clone()).instrument(step_span).await?;
      if control == PipelineControl::Stop {
        return Ok(PipelineResult::Stopped);
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<TData>, ctx_data: ContextData<TData>) -> Result<PipelineControl, Err> {
    if let Some(skip_if) = &step_def.skip_if {
      if skip_if(ctx_data.clone()) {
        event!(Level::INFO, "Step skipped by its skip condition.");
        return Ok(PipelineControl::Continue);
      }
    }

    let step_name = step_def.name.as_str();
    let phases = [
      ("before", self.before.get(step_name)),
      ("on", self.on.get(step_name)),
      ("after", self.after.get(step_name)),
    ];

    let has_handlers = phases.iter().any(|(_, handlers)| handlers.map_or(false, |v| !v.is_empty()));
    if !has_handlers {
      if step_def.optional {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(PipelineControl::Continue);
      }
      event!(Level::ERROR, "Non-optional step has no handlers.");
      return Err(Err::from(FlowError::HandlerMissing {
        step_name: step_def.name.clone(),
      }));
    }

    for (phase, handlers) in phases {
      for (handler_idx, handler_fn) in handlers.into_iter().flatten().enumerate() {
        match handler_fn(ctx_data.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::INFO, phase, handler_index = handler_idx, "Pipeline stopped by handler.");
            return Ok(PipelineControl::Stop);
          }
          Err(e) => {
            event!(Level::ERROR, phase, handler_index = handler_idx, error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Step finished.");
    Ok(PipelineControl::Continue)
  }
}
