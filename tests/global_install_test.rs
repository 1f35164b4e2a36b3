mod common;

use std::collections::HashMap;
use std::time::Duration;

use opentelemetry::global;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::{Span, TraceContextExt, Tracer};
use opentelemetry::Context;
use tokio_util::sync::CancellationToken;

use telemetry_bootstrap::{bootstrap, ExporterKind};

#[tokio::test]
async fn install_global_routes_global_api_to_providers() {
    let telemetry = bootstrap(
        &CancellationToken::new(),
        &common::settings(ExporterKind::Local, ""),
        &common::resource(),
    )
    .await
    .unwrap();
    telemetry.install_global();

    let span = global::tracer("global-test").start("request");
    assert!(span.is_recording());

    let cx = Context::current_with_span(span);
    let mut carrier: HashMap<String, String> = HashMap::new();
    global::get_text_map_propagator(|propagator| propagator.inject_context(&cx, &mut carrier));
    assert!(carrier.contains_key("traceparent"));

    cx.span().end();
    telemetry.shutdown(Duration::from_secs(5)).await.unwrap();
}
