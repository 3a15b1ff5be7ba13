// self
use crate::{
	_prelude::*,
	obs::{FlowKind, FlowOutcome, record_flow_outcome},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span wrapping one gatekeeper flow invocation.
///
/// The span carries `flow` and `stage` up front and gains an `outcome` field once
/// [`FlowSpan::finish`] runs.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind and stage, counting the attempt.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		record_flow_outcome(kind, FlowOutcome::Attempt);

		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth1_gatekeeper.flow",
				flow = kind.as_str(),
				stage,
				outcome = tracing::field::Empty
			);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self { kind }
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Records the terminal outcome of `result` on the span and the flow counter.
	pub fn finish<T, E>(&self, result: &Result<T, E>) {
		let outcome = if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure };

		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome.as_str());

		record_flow_outcome(self.kind, outcome);
	}

	/// Runs `fut` inside the span and records its outcome.
	pub async fn run<T, E, Fut>(self, fut: Fut) -> Result<T, E>
	where
		Fut: Future<Output = Result<T, E>>,
	{
		let result = self.instrument(fut).await;

		self.finish(&result);

		result
	}
}
