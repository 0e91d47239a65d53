//! Runner-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Runner ohne Konfigurationsdatei
//! lauffaehig ist.

use serde::{Deserialize, Serialize};
use wasmwirt_host::anbieter::AnbieterKonfiguration;
use wasmwirt_host::GrenzKonfiguration;
use wasmwirt_observability::logging::{log_filter_gueltig, log_format_gueltig};

/// Vollstaendige Runner-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Welches Modul, welcher Export, welche Argumente
    pub modul: ModulEinstellungen,
    /// Ressourcen-Grenzen fuer den Wirt
    pub grenzen: GrenzKonfiguration,
    /// Welche Standard-Importe bereitgestellt werden
    pub importe: AnbieterKonfiguration,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Ausgabe des Ergebnisses
    pub ausgabe: AusgabeEinstellungen,
}

/// Modul-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulEinstellungen {
    /// Pfad zum Modul (`.wasm` binaer oder `.wat` Text)
    pub pfad: String,
    /// Name des aufzurufenden Exports
    pub export: String,
    /// f64-Argumente fuer den Export
    pub argumente: Vec<f64>,
}

impl Default for ModulEinstellungen {
    fn default() -> Self {
        Self {
            pfad: "arraycopy.wasm".into(),
            export: "f1".into(),
            argumente: vec![0.0],
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level ("trace" .. "error") oder EnvFilter-Direktive ("wasmwirt=debug")
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Ausgabe-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AusgabeEinstellungen {
    /// Format: "text" oder "json"
    pub format: String,
}

impl Default for AusgabeEinstellungen {
    fn default() -> Self {
        Self {
            format: "text".into(),
        }
    }
}

impl RunnerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt `None` zurueck wenn die Datei nicht existiert; der Aufrufer
    /// entscheidet ueber Standardwerte und meldet das nach dem Logging-Setup.
    pub fn laden(pfad: &str) -> anyhow::Result<Option<Self>> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(Some(config))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft die Konfiguration auf offensichtliche Fehler
    pub fn validieren(&self) -> anyhow::Result<()> {
        if self.modul.pfad.is_empty() {
            anyhow::bail!("Pflichtfeld fehlt: modul.pfad");
        }
        if self.modul.export.is_empty() {
            anyhow::bail!("Pflichtfeld fehlt: modul.export");
        }
        if !log_filter_gueltig(&self.logging.level) {
            anyhow::bail!("Ungueltiges Log-Level: {}", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Ungueltiges Log-Format: {}", self.logging.format);
        }
        if !matches!(self.ausgabe.format.as_str(), "text" | "json") {
            anyhow::bail!("Ungueltiges Ausgabe-Format: {}", self.ausgabe.format);
        }
        Ok(())
    }

    /// Ist das Modul im Textformat angegeben?
    pub fn modul_ist_text(&self) -> bool {
        self.modul.pfad.ends_with(".wat")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = RunnerConfig::default();
        assert_eq!(cfg.modul.export, "f1");
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.importe.ext);
        assert_eq!(cfg.grenzen, GrenzKonfiguration::standard());
        assert!(cfg.validieren().is_ok());
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [modul]
            pfad = "demo.wat"
            argumente = [5.0, 2.5]

            [grenzen]
            max_instruktionen = 100000

            [importe]
            math = false
        "#;
        let cfg: RunnerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.modul.pfad, "demo.wat");
        assert_eq!(cfg.modul.argumente, vec![5.0, 2.5]);
        assert_eq!(cfg.grenzen.max_instruktionen, 100_000);
        assert!(!cfg.importe.math);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.modul.export, "f1");
        assert_eq!(cfg.grenzen.max_speicher_bytes, 64 * 1024 * 1024);
        assert!(cfg.importe.console);
        assert!(cfg.modul_ist_text());
    }

    #[test]
    fn datei_fehlt_liefert_none() {
        let cfg = RunnerConfig::laden("/existiert/nicht/wasmwirt.toml").unwrap();
        assert!(cfg.is_none());
    }

    #[test]
    fn vorhandene_datei_wird_gelesen() {
        let mut datei = tempfile::NamedTempFile::new().unwrap();
        datei
            .write_all(b"[modul]\nexport = \"f2\"\n[logging]\nlevel = \"wasmwirt=debug\"\n")
            .unwrap();
        let cfg = RunnerConfig::laden(datei.path().to_str().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(cfg.modul.export, "f2");
        assert_eq!(cfg.logging.level, "wasmwirt=debug");
        assert!(cfg.validieren().is_ok());
    }

    #[test]
    fn kaputte_datei_ist_fehler() {
        let mut datei = tempfile::NamedTempFile::new().unwrap();
        datei.write_all(b"[modul\npfad = ").unwrap();
        let err = RunnerConfig::laden(datei.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Konfigurationsfehler"));
    }

    #[test]
    fn validierung_erkennt_fehler() {
        let mut cfg = RunnerConfig::default();
        cfg.modul.export = String::new();
        assert!(cfg.validieren().is_err());

        let mut cfg = RunnerConfig::default();
        cfg.logging.level = "laut".into();
        assert!(cfg.validieren().is_err());

        let mut cfg = RunnerConfig::default();
        cfg.ausgabe.format = "xml".into();
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn filter_direktiven_wie_in_der_umgebung() {
        let mut cfg = RunnerConfig::default();
        cfg.logging.level = "info,wasmwirt::gast=warn".into();
        assert!(cfg.validieren().is_ok());

        cfg.logging.level = "wasmwirt=laut".into();
        assert!(cfg.validieren().is_err());
    }
}
