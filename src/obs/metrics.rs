// self
use crate::obs::{FlowKind, FlowOutcome, SecurityEvent};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth1_gatekeeper_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a security event via the global metrics recorder (when enabled).
pub fn record_security_metric(event: SecurityEvent) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth1_gatekeeper_security_event_total", "event" => event.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = event;
	}
}
