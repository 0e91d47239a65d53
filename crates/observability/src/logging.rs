//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `WW_LOG_LEVEL`: Log-Level oder EnvFilter-Direktive (`wasmwirt=debug`), Standard: info
//! - `WW_LOG_FORMAT`: Format (text/json), Standard: text
//!
//! Umgebungsvariablen haben Vorrang vor den Werten aus der Konfigurationsdatei.

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "WW_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "WW_LOG_FORMAT";

/// Aufgeloeste Logging-Einstellungen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEinstellungen {
    pub level: String,
    pub format: String,
}

/// Loest Level und Format auf: Umgebung vor Konfiguration.
///
/// `env` liefert den Wert einer Umgebungsvariable (in Tests austauschbar).
pub fn einstellungen_aufloesen(
    level: &str,
    format: &str,
    env: impl Fn(&str) -> Option<String>,
) -> LogEinstellungen {
    LogEinstellungen {
        level: env(ENV_LOG_LEVEL).unwrap_or_else(|| level.to_string()),
        format: env(ENV_LOG_FORMAT).unwrap_or_else(|| format.to_string()),
    }
}

/// Initialisiert das Logging-System.
///
/// Liest `WW_LOG_LEVEL` und `WW_LOG_FORMAT` aus der Umgebung und faellt auf
/// die uebergebenen Werte zurueck. Ein ungueltiger Filter wird zu `info`.
/// Gibt false zurueck wenn bereits ein globaler Subscriber gesetzt war.
pub fn logging_initialisieren(level: &str, format: &str) -> bool {
    let einstellungen = einstellungen_aufloesen(level, format, |k| std::env::var(k).ok());

    let filter =
        EnvFilter::try_new(&einstellungen.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let ergebnis = match einstellungen.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .try_init(),
        _ => fmt().with_env_filter(filter).with_target(true).try_init(),
    };
    ergebnis.is_ok()
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert einen Log-Filter: einfaches Level oder EnvFilter-Direktive
/// wie `wasmwirt=debug` bzw. `info,wasmwirt::gast=warn`.
///
/// Ein einzelnes Wort ohne `=` muss ein Level sein; `EnvFilter` wuerde es
/// sonst still als Target-Name akzeptieren.
pub fn log_filter_gueltig(filter: &str) -> bool {
    if log_level_gueltig(filter) {
        return true;
    }
    filter.contains('=')
        && filter.split(',').all(|teil| match teil.trim().rsplit_once('=') {
            Some((_, level)) => log_level_gueltig(level) || level == "off",
            None => log_level_gueltig(teil.trim()),
        })
        && EnvFilter::try_new(filter).is_ok()
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
