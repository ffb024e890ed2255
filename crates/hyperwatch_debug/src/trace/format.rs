//! Trace output formatters.

use std::fmt::Write;

use hyperwatch_foundation::{SignalRef, Value, VarRegistry};

use super::record::{Sample, TraceEvent, TraceRecord};

// =============================================================================
// Trace Formatter Trait
// =============================================================================

/// Renders trace records as text.
///
/// When a registry is given, signals are printed by name.
pub trait TraceFormatter {
    /// Formats one record.
    fn format(&self, record: &TraceRecord, registry: Option<&VarRegistry>) -> String;

    /// Formats several records, one per line.
    fn format_many(&self, records: &[&TraceRecord], registry: Option<&VarRegistry>) -> String {
        records
            .iter()
            .map(|r| self.format(r, registry))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn signal_name(signal: SignalRef, registry: Option<&VarRegistry>) -> String {
    let name = match (signal, registry) {
        (SignalRef::Prop(id), Some(r)) => r.prop_name(id),
        (SignalRef::Term(id), Some(r)) => r.term_name(id),
        _ => None,
    };
    match name {
        Some(name) => name.to_string(),
        None => match signal {
            SignalRef::Prop(id) => format!("p{}", id.index()),
            SignalRef::Term(id) => format!("t{}", id.index()),
            other => other.to_string(),
        },
    }
}

// =============================================================================
// Human-Readable Formatter
// =============================================================================

/// Formats records as indented, cycle-prefixed lines.
#[derive(Clone, Debug, Default)]
pub struct HumanFormatter {
    /// Whether to include timestamps.
    pub show_timestamps: bool,
    /// Whether to include record ids.
    pub show_ids: bool,
}

impl HumanFormatter {
    /// Creates a formatter with ids and timestamps hidden.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows timestamps.
    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.show_timestamps = true;
        self
    }

    /// Shows record ids.
    #[must_use]
    pub fn with_ids(mut self) -> Self {
        self.show_ids = true;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_timestamp(ns: u64) -> String {
        let us = ns / 1000;
        if us >= 1_000_000 {
            format!("{:.3}s", us as f64 / 1_000_000.0)
        } else if us >= 1000 {
            format!("{:.3}ms", us as f64 / 1000.0)
        } else {
            format!("{us}us")
        }
    }
}

impl TraceFormatter for HumanFormatter {
    fn format(&self, record: &TraceRecord, registry: Option<&VarRegistry>) -> String {
        let mut line = String::new();

        if self.show_ids {
            let _ = write!(line, "[{:06}] ", record.id);
        }
        let _ = write!(line, "C{:04} ", record.cycle);
        if self.show_timestamps {
            let _ = write!(line, "{:>10} ", Self::format_timestamp(record.timestamp_ns));
        }

        let _ = match &record.event {
            TraceEvent::CycleStart { cycle } => write!(line, "=== CYCLE {cycle} START ==="),
            TraceEvent::CycleEnd { cycle, properties } => {
                write!(line, "=== CYCLE {cycle} END ({properties} properties) ===")
            }
            TraceEvent::TraceUpdated {
                slot,
                signal,
                cycle,
                value,
            } => write!(
                line,
                "    WRITE {}.{slot} @{cycle} = {value}",
                signal_name(*signal, registry)
            ),
            TraceEvent::TraceExtended { slot, cycle } => {
                write!(line, "    EXTEND .{slot} to {cycle}")
            }
            TraceEvent::PropertyAdded { property, formula } => {
                write!(line, "  PROPERTY {property} := {formula}")
            }
            TraceEvent::VerdictChanged {
                property,
                holds,
                horizon,
                provisional,
            } => {
                let status = if *holds { "HOLDS" } else { "FAILS" };
                let mark = if *provisional { " (provisional)" } else { "" };
                write!(line, "  VERDICT {property} {status} at {horizon}{mark}")
            }
            TraceEvent::ProvisionalInvalidated { property, horizon } => {
                write!(line, "  INVALIDATED {property} at {horizon}")
            }
            TraceEvent::BatchChecked { property, agrees } => {
                let status = if *agrees { "AGREES" } else { "DISAGREES" };
                write!(line, "  CROSS-CHECK {property} {status}")
            }
            TraceEvent::SessionClosed {
                horizon,
                properties,
            } => write!(
                line,
                "=== SESSION CLOSED at {horizon} ({properties} properties) ==="
            ),
            TraceEvent::Custom { name, data } => write!(line, "  CUSTOM {name}: {data}"),
        };

        line
    }
}

// =============================================================================
// JSON Formatter
// =============================================================================

/// Formats records as JSON objects.
#[derive(Clone, Debug, Default)]
pub struct JsonFormatter {
    /// Whether to pretty-print.
    pub pretty: bool,
}

impl JsonFormatter {
    /// Creates a compact formatter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to multi-line output.
    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn escape_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    fn string(s: &str) -> String {
        format!("\"{}\"", Self::escape_string(s))
    }

    fn sample(sample: &Sample) -> String {
        match sample {
            Sample::Prop(v) => v.to_string(),
            Sample::Term(Value::Scalar(n)) => n.to_string(),
            Sample::Term(Value::Vector(items)) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                format!("[{}]", items.join(","))
            }
        }
    }

    fn event_fields(event: &TraceEvent, registry: Option<&VarRegistry>) -> Vec<(&'static str, String)> {
        match event {
            TraceEvent::CycleStart { cycle } => vec![("cycle", cycle.to_string())],
            TraceEvent::CycleEnd { cycle, properties } => vec![
                ("cycle", cycle.to_string()),
                ("properties", properties.to_string()),
            ],
            TraceEvent::TraceUpdated {
                slot,
                signal,
                cycle,
                value,
            } => vec![
                ("slot", slot.to_string()),
                ("signal", Self::string(&signal_name(*signal, registry))),
                ("cycle", cycle.to_string()),
                ("value", Self::sample(value)),
            ],
            TraceEvent::TraceExtended { slot, cycle } => {
                vec![("slot", slot.to_string()), ("cycle", cycle.to_string())]
            }
            TraceEvent::PropertyAdded { property, formula } => vec![
                ("property", Self::string(property)),
                ("formula", Self::string(formula)),
            ],
            TraceEvent::VerdictChanged {
                property,
                holds,
                horizon,
                provisional,
            } => vec![
                ("property", Self::string(property)),
                ("holds", holds.to_string()),
                ("horizon", horizon.to_string()),
                ("provisional", provisional.to_string()),
            ],
            TraceEvent::ProvisionalInvalidated { property, horizon } => vec![
                ("property", Self::string(property)),
                ("horizon", horizon.to_string()),
            ],
            TraceEvent::BatchChecked { property, agrees } => vec![
                ("property", Self::string(property)),
                ("agrees", agrees.to_string()),
            ],
            TraceEvent::SessionClosed {
                horizon,
                properties,
            } => vec![
                ("horizon", horizon.to_string()),
                ("properties", properties.to_string()),
            ],
            TraceEvent::Custom { name, data } => {
                vec![("name", Self::string(name)), ("data", Self::string(data))]
            }
        }
    }
}

impl TraceFormatter for JsonFormatter {
    fn format(&self, record: &TraceRecord, registry: Option<&VarRegistry>) -> String {
        let mut fields = vec![
            ("id", record.id.to_string()),
            ("cycle", record.cycle.to_string()),
            ("timestamp_ns", record.timestamp_ns.to_string()),
            ("type", Self::string(record.event.event_type())),
        ];
        let event: Vec<String> = Self::event_fields(&record.event, registry)
            .into_iter()
            .map(|(k, v)| format!("\"{k}\":{v}"))
            .collect();
        fields.push(("event", format!("{{{}}}", event.join(","))));

        if self.pretty {
            let body: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("  \"{k}\": {v}"))
                .collect();
            format!("{{\n{}\n}}", body.join(",\n"))
        } else {
            let body: Vec<String> = fields.iter().map(|(k, v)| format!("\"{k}\":{v}")).collect();
            format!("{{{}}}", body.join(","))
        }
    }

    fn format_many(&self, records: &[&TraceRecord], registry: Option<&VarRegistry>) -> String {
        let items: Vec<String> = records.iter().map(|r| self.format(r, registry)).collect();
        if self.pretty {
            format!("[\n{}\n]", items.join(",\n"))
        } else {
            format!("[{}]", items.join(","))
        }
    }
}
