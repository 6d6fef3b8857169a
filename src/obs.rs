//! Metrics emission and flow observability.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `connector_oauth.flow` with the
//!   `flow` (operation) and `stage` (connector side) fields.
//!
//! Metric emission is always compiled in; whether samples reach the recorder is a
//! runtime decision made by the [`MetricsEmitter`]'s publish flag.

pub mod emitter;
mod tracing;

pub use emitter::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// OAuth operations observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Consent URL construction.
	ConsentUrl,
	/// Authorization-code completion.
	CompleteOAuth,
}
impl FlowKind {
	/// Returns a stable label suitable for span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::ConsentUrl => "consent_url",
			FlowKind::CompleteOAuth => "complete_oauth",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a broker operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a flow outcome against the fixed metric registry through `metrics`.
pub fn record_flow_outcome(metrics: &MetricsEmitter, kind: FlowKind, outcome: FlowOutcome) {
	let metric = match (kind, outcome) {
		(FlowKind::ConsentUrl, FlowOutcome::Attempt) => BrokerMetric::ConsentUrlRequests,
		(FlowKind::ConsentUrl, FlowOutcome::Success) => BrokerMetric::ConsentUrlCompleted,
		(FlowKind::ConsentUrl, FlowOutcome::Failure) => BrokerMetric::ConsentUrlFailures,
		(FlowKind::CompleteOAuth, FlowOutcome::Attempt) => BrokerMetric::TokenExchangeRequests,
		(FlowKind::CompleteOAuth, FlowOutcome::Success) => BrokerMetric::TokenExchangeCompleted,
		(FlowKind::CompleteOAuth, FlowOutcome::Failure) => BrokerMetric::TokenExchangeFailures,
	};

	metrics.count(metric, 1);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_flow_outcome_noop_on_disabled_emitter() {
		record_flow_outcome(&MetricsEmitter::disabled(), FlowKind::ConsentUrl, FlowOutcome::Failure);
	}

	#[test]
	fn labels_are_stable() {
		assert_eq!(FlowKind::ConsentUrl.to_string(), "consent_url");
		assert_eq!(FlowKind::CompleteOAuth.to_string(), "complete_oauth");
		assert_eq!(FlowOutcome::Attempt.to_string(), "attempt");
	}
}
