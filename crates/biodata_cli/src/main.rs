//! CLI entry point.
//!
//! # Responsibility
//! - Build one measurement kind from command-line input.
//! - Print its serialized snapshot, or the validation error with its code.

mod commands;

use biodata_core::{
    default_log_level, init_logging, supported_kinds, BioResult, ConstrainedMeasurement,
    LogTarget, MeasurementKind, MeasurementValue, Record, TimeWindow, Timestamp,
};
use chrono::{DateTime, Utc};
use commands::{CommandLine, Commands};
use log::{error, info};
use std::process::ExitCode;

const LOG_LEVEL_ENV: &str = "BIODATA_LOG";

fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    if let Err(err) = setup_logging(&commands) {
        eprintln!("logging disabled: {err}");
    }

    match commands.command {
        Commands::Record {
            kind,
            value,
            unit,
            start,
            finish,
            pretty,
        } => match record(kind, value.as_deref(), unit.as_deref(), start, finish, pretty) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("event=record_failed module=cli kind={kind} code={}", err.code());
                eprintln!("[{}] {err}", err.code());
                ExitCode::FAILURE
            }
        },
        Commands::Kinds => {
            for kind in supported_kinds() {
                let constraints = kind.constraints();
                println!(
                    "{kind}\tunits=[{}]\tvalues=[{}]\tnullable={}",
                    constraints.allowed_units.join(", "),
                    constraints.allowed_values.join(", "),
                    constraints.value_can_be_null
                );
            }
            ExitCode::SUCCESS
        }
        Commands::Version => {
            println!("biodata_core version={}", biodata_core::core_version());
            ExitCode::SUCCESS
        }
    }
}

fn setup_logging(commands: &CommandLine) -> Result<(), String> {
    let level = commands
        .log_level
        .clone()
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .unwrap_or_else(|| default_log_level().to_string());
    let target = match commands.log_dir.as_deref() {
        Some(dir) => LogTarget::directory(dir)?,
        None => LogTarget::Stderr,
    };
    init_logging(&level, target)
}

fn record(
    kind: MeasurementKind,
    value: Option<&str>,
    unit: Option<&str>,
    start: Option<String>,
    finish: Option<String>,
    pretty: bool,
) -> BioResult<String> {
    let window = TimeWindow {
        start: start.map(time_arg).transpose()?,
        finish: finish.map(time_arg).transpose()?,
    };

    let mut entity = ConstrainedMeasurement::empty(kind);
    entity.add_measurement(value.map(parse_value), unit, Some(window))?;
    info!(
        "event=record_ok module=cli kind={kind} count={}",
        entity.measurements().len()
    );

    if pretty {
        entity.to_serialized_text_pretty()
    } else {
        entity.to_serialized_text()
    }
}

fn time_arg(raw: String) -> BioResult<Timestamp> {
    biodata_core::validate_timestamp(raw)
}

/// Reads a raw argument as the narrowest matching value shape.
fn parse_value(raw: &str) -> MeasurementValue {
    if let Ok(integer) = raw.parse::<i64>() {
        return MeasurementValue::Integer(integer);
    }
    if let Ok(float) = raw.parse::<f64>() {
        if float.is_finite() {
            return MeasurementValue::Float(float);
        }
    }
    match raw {
        "true" => return MeasurementValue::Boolean(true),
        "false" => return MeasurementValue::Boolean(false),
        _ => {}
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return MeasurementValue::DateTime(instant.with_timezone(&Utc));
    }
    MeasurementValue::Text(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse_value, record};
    use biodata_core::{MeasurementKind, MeasurementValue};

    #[test]
    fn parse_value_prefers_narrowest_shape() {
        assert_eq!(parse_value("72"), MeasurementValue::Integer(72));
        assert_eq!(parse_value("0.5"), MeasurementValue::Float(0.5));
        assert_eq!(parse_value("true"), MeasurementValue::Boolean(true));
        assert_eq!(parse_value("AB+"), MeasurementValue::Text("AB+".to_string()));
        assert_eq!(parse_value("NaN"), MeasurementValue::Text("NaN".to_string()));
        assert!(matches!(
            parse_value("1990-04-01T00:00:00Z"),
            MeasurementValue::DateTime(_)
        ));
    }

    #[test]
    fn record_prints_heart_rate_snapshot() {
        let text = record(MeasurementKind::HeartRate, Some("123"), Some("bpm"), None, None, false)
            .expect("valid heart rate");
        let parsed: serde_json::Value = serde_json::from_str(&text).expect("JSON output");
        assert_eq!(parsed["kind"], "HeartRate");
        assert_eq!(parsed["measurementCollection"]["measurements"][0]["value"], 123);
    }

    #[test]
    fn record_reports_validation_errors() {
        let err = record(MeasurementKind::HeartRate, Some("123"), Some("beats"), None, None, false)
            .unwrap_err();
        assert_eq!(err.code(), 700);

        let err = record(
            MeasurementKind::Sleep,
            None,
            None,
            Some("later".to_string()),
            None,
            false,
        )
        .unwrap_err();
        assert_eq!(err.code(), 621);
    }
}
