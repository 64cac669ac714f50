use crate::config::{LogFormat, TelemetryConfig};
use opentelemetry::{KeyValue, global, trace::TracerProvider as _};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    logs::SdkLoggerProvider,
    metrics::{PeriodicReader, SdkMeterProvider},
    propagation::TraceContextPropagator,
    trace::SdkTracerProvider,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{EnvFilter, Registry, filter::Directive, layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE: &str = "messages-api";

/// Keeps the OpenTelemetry providers alive and flushes them on shutdown.
#[derive(Debug, Default)]
#[must_use]
pub struct TelemetryGuard {
    providers: Option<Providers>,
}

#[derive(Debug)]
struct Providers {
    tracer: SdkTracerProvider,
    meter: SdkMeterProvider,
    logger: SdkLoggerProvider,
}

impl TelemetryGuard {
    /// Flushes and shuts down all exporters.
    pub fn shutdown(self) {
        let Some(providers) = self.providers else {
            return;
        };
        if let Err(e) = providers.tracer.shutdown() {
            tracing::warn!(error = %e, "Failed to shut down tracer provider");
        }
        if let Err(e) = providers.meter.shutdown() {
            tracing::warn!(error = %e, "Failed to shut down meter provider");
        }
        if let Err(e) = providers.logger.shutdown() {
            tracing::warn!(error = %e, "Failed to shut down logger provider");
        }
    }
}

fn env_filter(default: &str) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
    ["sqlx=warn", "hyper=warn", "h2=warn", "tonic=warn"]
        .into_iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(filter, EnvFilter::add_directive)
}

fn init_providers(endpoint: &str) -> anyhow::Result<Providers> {
    let resource = Resource::builder()
        .with_attributes(vec![
            KeyValue::new(SERVICE_NAME, SERVICE),
            KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        ])
        .build();

    global::set_text_map_propagator(TraceContextPropagator::new());

    let tracer = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(opentelemetry_otlp::SpanExporter::builder().with_tonic().with_endpoint(endpoint).build()?)
        .build();
    global::set_tracer_provider(tracer.clone());

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder().with_tonic().with_endpoint(endpoint).build()?;
    let meter = SdkMeterProvider::builder()
        .with_resource(resource.clone())
        .with_reader(PeriodicReader::builder(metric_exporter).build())
        .build();
    global::set_meter_provider(meter.clone());

    let logger = SdkLoggerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(opentelemetry_otlp::LogExporter::builder().with_tonic().with_endpoint(endpoint).build()?)
        .build();

    Ok(Providers { tracer, meter, logger })
}

/// Installs the global tracing subscriber, exporting over OTLP when an endpoint is configured.
///
/// # Errors
/// Returns an error if an OTLP exporter cannot be built.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    let providers = config.otlp_endpoint.as_deref().map(init_providers).transpose()?;

    let trace_layer = providers.as_ref().map(|p| OpenTelemetryLayer::new(p.tracer.tracer(SERVICE)));
    let log_layer = providers.as_ref().map(|p| OpenTelemetryTracingBridge::new(&p.logger));

    let registry = Registry::default().with(env_filter("info")).with(trace_layer).with(log_layer);

    match config.log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init()?,
    }

    Ok(TelemetryGuard { providers })
}

/// Installs a plain text subscriber for tests. Safe to call repeatedly.
pub fn init_test_telemetry() {
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter("warn")).with_test_writer().try_init();
}
