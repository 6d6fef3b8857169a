//! Publish-gated metric emission against a closed metric registry.
//!
//! [`MetricsEmitter`] replaces process-wide recorder state with an owned,
//! injectable handle: construct one from an [`EmitterApp`] identity and a
//! [`MetricsClientConfig`], hand clones to whoever emits, and drop it to stop
//! emitting. Every emission is a guaranteed no-op when the publish flag is off or
//! the emitter was built with [`MetricsEmitter::disabled`]. Emission never
//! returns an error and never panics, so instrumented code paths cannot be
//! destabilized by observability; dropping a sample is always preferable to
//! failing the caller.

// self
use crate::_prelude::*;

/// Subsystem identity attached to every emitted sample as the `app` label.
///
/// Fixed for the lifetime of an emitter; swap the emitter to change it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitterApp {
	/// API server handling consent and completion requests.
	Server,
	/// Connector worker processes.
	Worker,
	/// Job scheduler.
	Scheduler,
}
impl EmitterApp {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EmitterApp::Server => "server",
			EmitterApp::Worker => "worker",
			EmitterApp::Scheduler => "scheduler",
		}
	}
}
impl Display for EmitterApp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Kind of a registry metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
	/// Monotonically increasing counter.
	Counter,
	/// Point-in-time value.
	Gauge,
	/// Distribution of duration samples.
	Histogram,
}

/// Closed registry of metrics the crate may emit.
///
/// Wire names are fixed at build time; there are no dynamic metric names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BrokerMetric {
	/// Consent URL construction attempts.
	ConsentUrlRequests,
	/// Consent URLs built successfully.
	ConsentUrlCompleted,
	/// Consent URL constructions that failed.
	ConsentUrlFailures,
	/// Token exchange attempts.
	TokenExchangeRequests,
	/// Token exchanges completed successfully.
	TokenExchangeCompleted,
	/// Token exchanges that failed.
	TokenExchangeFailures,
	/// Wall-clock time spent on the token endpoint call.
	TokenExchangeElapsed,
	/// Parameter rows visible during the most recent lookup.
	VisibleParameterRows,
}
impl BrokerMetric {
	/// Every registry entry, in declaration order.
	pub const ALL: &'static [BrokerMetric] = &[
		BrokerMetric::ConsentUrlRequests,
		BrokerMetric::ConsentUrlCompleted,
		BrokerMetric::ConsentUrlFailures,
		BrokerMetric::TokenExchangeRequests,
		BrokerMetric::TokenExchangeCompleted,
		BrokerMetric::TokenExchangeFailures,
		BrokerMetric::TokenExchangeElapsed,
		BrokerMetric::VisibleParameterRows,
	];

	/// Stable wire name registered with the recorder.
	pub const fn metric_name(self) -> &'static str {
		match self {
			BrokerMetric::ConsentUrlRequests => "connector_oauth_consent_url_requests_total",
			BrokerMetric::ConsentUrlCompleted => "connector_oauth_consent_url_completed_total",
			BrokerMetric::ConsentUrlFailures => "connector_oauth_consent_url_failures_total",
			BrokerMetric::TokenExchangeRequests => "connector_oauth_token_exchange_requests_total",
			BrokerMetric::TokenExchangeCompleted =>
				"connector_oauth_token_exchange_completed_total",
			BrokerMetric::TokenExchangeFailures => "connector_oauth_token_exchange_failures_total",
			BrokerMetric::TokenExchangeElapsed => "connector_oauth_token_exchange_elapsed_ms",
			BrokerMetric::VisibleParameterRows => "connector_oauth_visible_parameter_rows",
		}
	}

	/// Kind the wire name is registered as.
	pub const fn kind(self) -> MetricKind {
		match self {
			BrokerMetric::ConsentUrlRequests
			| BrokerMetric::ConsentUrlCompleted
			| BrokerMetric::ConsentUrlFailures
			| BrokerMetric::TokenExchangeRequests
			| BrokerMetric::TokenExchangeCompleted
			| BrokerMetric::TokenExchangeFailures => MetricKind::Counter,
			BrokerMetric::TokenExchangeElapsed => MetricKind::Histogram,
			BrokerMetric::VisibleParameterRows => MetricKind::Gauge,
		}
	}

	/// Human-readable description registered with the recorder.
	pub const fn description(self) -> &'static str {
		match self {
			BrokerMetric::ConsentUrlRequests => "Consent URL construction attempts.",
			BrokerMetric::ConsentUrlCompleted => "Consent URLs built successfully.",
			BrokerMetric::ConsentUrlFailures => "Consent URL constructions that failed.",
			BrokerMetric::TokenExchangeRequests => "Token exchange attempts.",
			BrokerMetric::TokenExchangeCompleted => "Token exchanges completed successfully.",
			BrokerMetric::TokenExchangeFailures => "Token exchanges that failed.",
			BrokerMetric::TokenExchangeElapsed =>
				"Wall-clock milliseconds spent on the token endpoint call.",
			BrokerMetric::VisibleParameterRows =>
				"Parameter rows visible during the most recent lookup.",
		}
	}
}
impl Display for BrokerMetric {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.metric_name())
	}
}

/// Immutable transport configuration for the statistics-collection backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsClientConfig {
	/// Agent host the installed recorder should ship samples to.
	pub host: String,
	/// Agent port the installed recorder should ship samples to.
	pub port: u16,
	/// Whether emissions reach the recorder at all.
	pub publish: bool,
}
impl MetricsClientConfig {
	/// Creates a new configuration.
	pub fn new(host: impl Into<String>, port: u16, publish: bool) -> Self {
		Self { host: host.into(), port, publish }
	}
}

/// Sink abstraction the emitter forwards samples to.
///
/// Implementations must swallow their own delivery failures; the emitter treats
/// every call as infallible.
pub trait MetricSink
where
	Self: Send + Sync,
{
	/// Adds `delta` to a counter.
	fn count(&self, app: EmitterApp, metric: BrokerMetric, delta: u64);

	/// Sets a gauge to `value`.
	fn gauge(&self, app: EmitterApp, metric: BrokerMetric, value: f64);

	/// Records one duration sample on a histogram.
	fn record_duration(&self, app: EmitterApp, metric: BrokerMetric, elapsed: Duration);
}

/// Sink forwarding samples to the process's installed [`metrics`] recorder.
///
/// Without an installed recorder the facade drops samples silently, which keeps
/// the never-fails contract even in bare processes.
#[derive(Clone, Copy, Debug, Default)]
struct RecorderSink;
impl MetricSink for RecorderSink {
	fn count(&self, app: EmitterApp, metric: BrokerMetric, delta: u64) {
		metrics::counter!(metric.metric_name(), "app" => app.as_str()).increment(delta);
	}

	fn gauge(&self, app: EmitterApp, metric: BrokerMetric, value: f64) {
		metrics::gauge!(metric.metric_name(), "app" => app.as_str()).set(value);
	}

	fn record_duration(&self, app: EmitterApp, metric: BrokerMetric, elapsed: Duration) {
		metrics::histogram!(metric.metric_name(), "app" => app.as_str())
			.record(elapsed.as_seconds_f64() * 1_000.0);
	}
}

/// Sink that drops every sample.
#[derive(Clone, Copy, Debug, Default)]
struct NoopSink;
impl MetricSink for NoopSink {
	fn count(&self, _app: EmitterApp, _metric: BrokerMetric, _delta: u64) {}

	fn gauge(&self, _app: EmitterApp, _metric: BrokerMetric, _value: f64) {}

	fn record_duration(&self, _app: EmitterApp, _metric: BrokerMetric, _elapsed: Duration) {}
}

/// Publish-gated handle recording against the fixed metric registry.
#[derive(Clone)]
pub struct MetricsEmitter {
	app: EmitterApp,
	config: MetricsClientConfig,
	sink: Arc<dyn MetricSink>,
}
impl MetricsEmitter {
	/// Creates an emitter for the given identity + configuration.
	///
	/// A disabled publish flag substitutes a no-op sink so nothing reaches the
	/// recorder.
	pub fn new(app: EmitterApp, config: MetricsClientConfig) -> Self {
		Self::with_sink(app, config, Arc::new(RecorderSink))
	}

	/// Creates an emitter with a caller-provided sink (custom backends, harnesses).
	///
	/// The publish flag still wins: a disabled configuration drops every sample
	/// before it reaches the sink.
	pub fn with_sink(
		app: EmitterApp,
		config: MetricsClientConfig,
		sink: Arc<dyn MetricSink>,
	) -> Self {
		let sink: Arc<dyn MetricSink> =
			if config.publish { sink } else { Arc::new(NoopSink) };

		Self { app, config, sink }
	}

	/// Emitter whose emissions are all no-ops; the "uninitialized" state.
	pub fn disabled() -> Self {
		Self {
			app: EmitterApp::Server,
			config: MetricsClientConfig::new("", 0, false),
			sink: Arc::new(NoopSink),
		}
	}

	/// Emitting application identity.
	pub fn app(&self) -> EmitterApp {
		self.app
	}

	/// Transport configuration (host/port for the recorder installer + publish flag).
	pub fn config(&self) -> &MetricsClientConfig {
		&self.config
	}

	/// Whether samples are forwarded at all.
	pub fn is_enabled(&self) -> bool {
		self.config.publish
	}

	/// Adds `delta` to a counter; no-op when disabled, never panics.
	pub fn count(&self, metric: BrokerMetric, delta: u64) {
		self.sink.count(self.app, metric, delta);
	}

	/// Sets a gauge; no-op when disabled, never panics.
	pub fn gauge(&self, metric: BrokerMetric, value: f64) {
		self.sink.gauge(self.app, metric, value);
	}

	/// Records a duration sample; no-op when disabled, never panics.
	pub fn record_duration(&self, metric: BrokerMetric, elapsed: Duration) {
		self.sink.record_duration(self.app, metric, elapsed);
	}

	/// Registers every registry entry's description with the installed recorder.
	pub fn describe_metrics(&self) {
		if !self.is_enabled() {
			return;
		}

		for metric in BrokerMetric::ALL.iter().copied() {
			match metric.kind() {
				MetricKind::Counter =>
					metrics::describe_counter!(metric.metric_name(), metric.description()),
				MetricKind::Gauge =>
					metrics::describe_gauge!(metric.metric_name(), metric.description()),
				MetricKind::Histogram =>
					metrics::describe_histogram!(metric.metric_name(), metric.description()),
			}
		}
	}
}
impl Default for MetricsEmitter {
	fn default() -> Self {
		Self::disabled()
	}
}
impl Debug for MetricsEmitter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MetricsEmitter")
			.field("app", &self.app)
			.field("config", &self.config)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Default)]
	struct CapturingSink(Mutex<Vec<(EmitterApp, BrokerMetric)>>);
	impl CapturingSink {
		fn seen(&self) -> Vec<(EmitterApp, BrokerMetric)> {
			self.0.lock().clone()
		}
	}
	impl MetricSink for CapturingSink {
		fn count(&self, app: EmitterApp, metric: BrokerMetric, _delta: u64) {
			self.0.lock().push((app, metric));
		}

		fn gauge(&self, app: EmitterApp, metric: BrokerMetric, _value: f64) {
			self.0.lock().push((app, metric));
		}

		fn record_duration(&self, app: EmitterApp, metric: BrokerMetric, _elapsed: Duration) {
			self.0.lock().push((app, metric));
		}
	}

	fn emit_all(emitter: &MetricsEmitter) {
		for metric in BrokerMetric::ALL.iter().copied() {
			match metric.kind() {
				MetricKind::Counter => emitter.count(metric, 1),
				MetricKind::Gauge => emitter.gauge(metric, 42.0),
				MetricKind::Histogram => emitter.record_duration(metric, Duration::seconds(1)),
			}
		}
	}

	#[test]
	fn disabled_emitter_never_panics_for_any_registry_entry() {
		let emitter = MetricsEmitter::disabled();

		emit_all(&emitter);
		emitter.describe_metrics();

		assert!(!emitter.is_enabled());
	}

	#[test]
	fn publish_disabled_drops_samples_before_the_sink() {
		let sink = Arc::new(CapturingSink::default());
		let emitter = MetricsEmitter::with_sink(
			EmitterApp::Worker,
			MetricsClientConfig::new("localhost", 8125, false),
			sink.clone(),
		);

		emit_all(&emitter);

		assert!(sink.seen().is_empty(), "Disabled configurations must not reach the sink.");
	}

	#[test]
	fn publish_enabled_forwards_samples_tagged_with_the_app() {
		let sink = Arc::new(CapturingSink::default());
		let emitter = MetricsEmitter::with_sink(
			EmitterApp::Scheduler,
			MetricsClientConfig::new("localhost", 8125, true),
			sink.clone(),
		);

		emit_all(&emitter);

		let seen = sink.seen();

		assert_eq!(seen.len(), BrokerMetric::ALL.len());
		assert!(seen.iter().all(|(app, _)| *app == EmitterApp::Scheduler));
	}

	#[test]
	fn recorder_sink_never_panics_without_an_installed_recorder() {
		let emitter = MetricsEmitter::new(
			EmitterApp::Server,
			MetricsClientConfig::new("localhost", 8125, true),
		);

		emit_all(&emitter);
		emitter.describe_metrics();
	}

	#[test]
	fn registry_names_are_unique() {
		let mut names: Vec<_> =
			BrokerMetric::ALL.iter().map(|metric| metric.metric_name()).collect();

		names.sort_unstable();
		names.dedup();

		assert_eq!(names.len(), BrokerMetric::ALL.len());
	}
}
