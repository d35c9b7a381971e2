//! Writers the structured loggers emit into.

use std::{
    fmt::{self, Write as _},
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::{
    Dispatch, Event, Subscriber,
    field::{Field, Visit},
    level_filters::LevelFilter,
};
use tracing_subscriber::{
    Layer,
    fmt::{
        self as tracing_fmt, FmtContext, FormatEvent, FormatFields,
        format::Writer,
        writer::{BoxMakeWriter, MakeWriterExt},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
};

use crate::error::LogError;

/// Field carrying a JSON-encoded mapping that is nested into the record.
const DETAILS_FIELD: &str = "details";

pub fn console() -> BoxMakeWriter {
    BoxMakeWriter::new(io::stdout)
}

/// File sink; the mutex keeps each record on its own line.
pub fn file(file: File) -> BoxMakeWriter {
    BoxMakeWriter::new(Mutex::new(file))
}

/// Combines sinks into one that forwards every record to each of them.
pub fn fan_out(sinks: impl IntoIterator<Item = BoxMakeWriter>) -> BoxMakeWriter {
    sinks
        .into_iter()
        .reduce(|all, sink| BoxMakeWriter::new(all.and(sink)))
        .unwrap_or_else(|| BoxMakeWriter::new(io::sink))
}

/// Creates `dir` if needed and opens `dir/name` for appending.
pub(crate) fn open_append(dir: &Path, name: &str) -> Result<(File, PathBuf), LogError> {
    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(|source| LogError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %dir.display(), "log directory created");
    }

    let path = dir.join(name);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LogError::OpenFile {
            path: path.clone(),
            source,
        })?;

    Ok((file, path))
}

/// Builds an isolated subscriber writing NDJSON records to `writer`.
pub(crate) fn json_dispatch(writer: BoxMakeWriter, level: LevelFilter) -> Dispatch {
    let layer = tracing_fmt::layer()
        .event_format(JsonRecord)
        .with_writer(writer)
        .with_filter(level);

    Dispatch::new(tracing_subscriber::registry().with(layer))
}

/// One flat JSON object per event: `timestamp`, `level`, `target`, then the
/// event fields. Numbers and booleans stay numeric; `details` is nested as a
/// JSON value.
struct JsonRecord;

impl<S, N> FormatEvent<S, N> for JsonRecord
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        let mut record = Map::new();
        record.insert(
            "timestamp".to_string(),
            Utc::now()
                .to_rfc3339_opts(SecondsFormat::Micros, true)
                .into(),
        );
        record.insert("level".to_string(), meta.level().to_string().into());
        record.insert("target".to_string(), meta.target().into());
        event.record(&mut FieldVisitor(&mut record));

        let line = serde_json::to_string(&record).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

struct FieldVisitor<'a>(&'a mut Map<String, Value>);

impl FieldVisitor<'_> {
    fn insert(&mut self, field: &Field, value: Value) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.into());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, value.to_string().into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{value:?}");
        let value = if field.name() == DETAILS_FIELD {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        } else {
            Value::String(text)
        };
        self.insert(field, value);
    }
}
