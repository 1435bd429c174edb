use crate::Status;
use tracing::{level_filters::LevelFilter, Level};
use tracing_stackdriver::CloudTraceConfiguration;
use tracing_subscriber::{
    fmt::writer::MakeWriterExt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

pub struct Tracing;

impl Tracing {
    /// Local setup logging to stdout. Structured `LogEvent`s are emitted at
    /// debug level and show up with `verbose`.
    pub fn setup(name: &str, verbose: bool) -> Result<(), Status> {
        let level = match verbose {
            true => LevelFilter::DEBUG,
            false => LevelFilter::INFO,
        };

        match tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::Layer::new()
                    .with_target(false)
                    .with_writer(std::io::stdout.with_max_level(Level::DEBUG))
                    .with_filter(level),
            )
            .try_init()
        {
            Ok(()) => {
                tracing::debug!("Tracing setup for '{name}'");
                Ok(())
            }
            Err(e) => {
                eprintln!("{e}");
                Err(Status::new("Failed to setup tracing", e))
            }
        }
    }

    /// Production setup exporting JSON logs with Cloud Trace correlation.
    pub fn setup_prod(project_id: &str) -> Result<(), Status> {
        match tracing_subscriber::registry()
            .with(tracing_opentelemetry::layer())
            .with(
                tracing_stackdriver::layer()
                    .with_cloud_trace(CloudTraceConfiguration {
                        project_id: project_id.to_owned(),
                    })
                    .with_writer(std::io::stdout.with_max_level(Level::INFO)),
            )
            .try_init()
        {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("{e}");
                Err(Status::new("Failed to setup tracing", e))
            }
        }
    }
}
