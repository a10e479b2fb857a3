use std::io::IsTerminal;
use std::{net::SocketAddr, time::Duration};

use axum::http::{HeaderName, Request, Response};
use axum::{Router, body::Body, extract::ConnectInfo};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, Subscriber, subscriber::set_global_default};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Output format of the global subscriber, chosen by `application.log_format`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formatter {
    #[default]
    Bunyan,
    Pretty,
    Otel,
    Otlp,
}

pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    formatter: Formatter,
    sink: Sink,
) -> Box<dyn Subscriber + Send + Sync>
where
    Sink: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    match formatter {
        Formatter::Bunyan => Box::new(bunyan_subscriber(filter_layer, name, sink)),
        Formatter::Pretty => Box::new(pretty_subscriber(filter_layer, sink)),
        Formatter::Otel => Box::new(otel_subscriber(filter_layer, name)),
        Formatter::Otlp => Box::new(otlp_subscriber(filter_layer, name)),
    }
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}

/// Tags every request with an `x-request-id` (echoed on the response) and
/// wraps it in a span that records status and latency.
pub fn tracing_layer(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_layer_make_span_with)
                    .on_request(trace_layer_on_request)
                    .on_response(trace_layer_on_response),
            )
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
    )
}

fn trace_layer_make_span_with(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("<unknown>");
    let source = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(
            || tracing::field::display(String::from("<unknown>")),
            |connect_info| tracing::field::display(connect_info.ip().to_string()),
        );

    tracing::info_span!("request",
        %request_id,
        uri = %request.uri(),
        method = %request.method(),
        %source,
        status = tracing::field::Empty,
        latency = tracing::field::Empty,
    )
}

fn trace_layer_on_request(_request: &Request<Body>, _span: &Span) {
    tracing::trace!("Got request");
}

fn trace_layer_on_response(response: &Response<Body>, latency: Duration, span: &Span) {
    span.record(
        "latency",
        tracing::field::display(format!("{}ms", latency.as_millis())),
    );
    span.record("status", tracing::field::display(response.status()));
    tracing::trace!("Responded");
}

fn bunyan_subscriber<Sink>(
    filter_layer: EnvFilter,
    name: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let formatting_layer = BunyanFormattingLayer::new(name, sink);
    Registry::default()
        .with(filter_layer)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

fn pretty_subscriber<Sink>(filter_layer: EnvFilter, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let formatting_layer = tracing_subscriber::fmt::Layer::new()
        .with_ansi(std::io::stdout().is_terminal())
        .with_writer(sink)
        .pretty();
    Registry::default()
        .with(filter_layer)
        .with(tracing_error::ErrorLayer::default())
        .with(formatting_layer)
}

fn otel_subscriber(filter_layer: EnvFilter, name: String) -> impl Subscriber + Send + Sync {
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .build();
    let tracer = provider.tracer(name);
    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    Registry::default().with(filter_layer).with(telemetry_layer)
}

fn otlp_subscriber(filter_layer: EnvFilter, name: String) -> impl Subscriber + Send + Sync {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .build()
        .expect("building otlp exporter");

    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter)
        .build();

    let tracer = provider.tracer(name);
    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    Registry::default().with(filter_layer).with(telemetry_layer)
}
