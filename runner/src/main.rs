//! Wasmwirt Runner – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging, fuehrt den
//! konfigurierten Export aus und gibt das Ergebnis auf stdout aus.

use anyhow::Result;
use wasmwirt_observability::logging_initialisieren;
use wasmwirt_runner::{config::RunnerConfig, Runner};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("WASMWIRT_CONFIG")
        .unwrap_or_else(|_| "wasmwirt.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let geladen = RunnerConfig::laden(&config_pfad)?;
    let datei_fehlt = geladen.is_none();
    let config = geladen.unwrap_or_default();

    logging_initialisieren(&config.logging.level, &config.logging.format);

    if datei_fehlt {
        tracing::warn!(
            pfad = %config_pfad,
            "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
        );
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Wasmwirt Runner wird initialisiert"
    );

    let ausgabe_format = config.ausgabe.format.clone();
    let runner = Runner::neu(config);
    let lauf = runner.ausfuehren().await?;

    println!("{}", lauf.formatieren(&ausgabe_format)?);
    Ok(())
}
