// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use stepflow::{ContextData, FlowError, PipelineControl};
use tracing::Level;

/// Context shaped like a small booking saga: every step records itself and
/// some steps write to the simulated "store".
#[derive(Clone, Debug, Default)]
pub struct SagaContext {
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
  pub fail_at: Option<String>,
  pub reserved_seats: u32,
  pub ledger: Vec<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("stepflow error: {0}")]
  Flow(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<FlowError> for TestError {
  fn from(err: FlowError) -> Self {
    TestError::Flow(format!("{:?}", err))
  }
}

/// Records `step_name`, honours `stop_at`/`fail_at`, appends `ledger_entry`.
pub fn recording_handler(step_name: &'static str, ledger_entry: &'static str) -> stepflow::Handler<SagaContext, TestError> {
  Box::new(move |ctx: ContextData<SagaContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push(step_name.to_string());
      if guard.fail_at.as_deref() == Some(step_name) {
        return Err(TestError::Step(step_name.to_string()));
      }
      guard.ledger.push(ledger_entry.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, "recorded");
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
