use std::time::Instant;

use crate::routines::output::OutputFile;
use crate::routines::settings::Settings;
use eyre::{Result, WrapErr};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Setup logging for a run
///
/// The level comes from `log.level` and defaults to `info`. Messages always go
/// to stderr so stdout stays free for the JSON result. When both `log.file`
/// and `paths.output` are set, a copy without ANSI colors is written to that
/// file inside the output directory.
pub fn setup_log(settings: &Settings) -> Result<()> {
    let env_filter = EnvFilter::try_new(settings.log.level.as_str())
        .wrap_err_with(|| format!("Invalid log level '{}'", settings.log.level))?;

    let timestamper = CompactTimestamp {
        start: Instant::now(),
    };

    let file_layer = match (&settings.paths.output, &settings.log.file) {
        (Some(folder), Some(name)) => {
            let outputfile = OutputFile::new(folder, name)?;
            Some(
                fmt::layer()
                    .with_writer(outputfile.file_owned())
                    .with_ansi(false)
                    .with_timer(timestamper.clone()),
            )
        }
        _ => None,
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_timer(timestamper);

    Registry::default()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .wrap_err("Failed to initialize logging")?;

    Ok(())
}

#[derive(Clone)]
struct CompactTimestamp {
    start: Instant,
}

impl FormatTime for CompactTimestamp {
    fn format_time(
        &self,
        w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> Result<(), std::fmt::Error> {
        let elapsed = self.start.elapsed();
        let minutes = elapsed.as_secs() / 60;
        let seconds = elapsed.as_secs() % 60;
        let millis = elapsed.subsec_millis();

        write!(w, "{:02}m {:02}.{:03}s", minutes, seconds, millis)
    }
}
