//! Process-wide registration of a bootstrapped [`Telemetry`].

use opentelemetry::global;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};

use crate::lifecycle::Telemetry;

impl Telemetry {
    /// Make these providers the ones returned by `opentelemetry::global`.
    ///
    /// Also installs the W3C trace-context and baggage propagators. Logs have
    /// no global provider; they reach the pipeline through
    /// [`crate::observability::logging::init`].
    pub fn install_global(&self) {
        global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
            Box::new(TraceContextPropagator::new()),
            Box::new(BaggagePropagator::new()),
        ]));
        global::set_tracer_provider(self.tracer_provider().clone());
        global::set_meter_provider(self.meter_provider().clone());

        tracing::debug!("Telemetry providers installed globally");
    }
}
