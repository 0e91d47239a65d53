//! wasmwirt-runner – Bibliotheks-Root
//!
//! Bettet den Modul-Wirt ein: Konfiguration -> Byte-Quelle -> Instanziierung
//! -> Export-Aufruf. Stellt den Einstiegspunkt fuer Tests bereit.

pub mod config;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use wasmwirt_host::{anbieter, ByteQuelle, DateiQuelle, ModulWirt, WirtError};

use config::RunnerConfig;

/// Liest eine `.wat`-Datei und assembliert sie zum binaeren Modul
#[derive(Debug, Clone)]
pub struct WatQuelle {
    datei: DateiQuelle,
}

impl WatQuelle {
    pub fn neu(pfad: impl Into<std::path::PathBuf>) -> Self {
        Self {
            datei: DateiQuelle::neu(pfad),
        }
    }
}

#[async_trait]
impl ByteQuelle for WatQuelle {
    async fn bytes_holen(&self) -> wasmwirt_host::Result<Vec<u8>> {
        let text = self.datei.bytes_holen().await?;
        wat::parse_bytes(&text)
            .map(|b| b.into_owned())
            .map_err(|e| WirtError::ModulUngueltig(format!("WAT-Fehler: {e}")))
    }

    fn beschreibung(&self) -> String {
        format!("wat:{}", self.datei.pfad().display())
    }
}

/// Ergebnis eines Runner-Laufs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ausfuehrung {
    pub export: String,
    pub argumente: Vec<f64>,
    pub ergebnisse: Vec<f64>,
}

impl Ausfuehrung {
    /// Formatiert das Ergebnis fuer stdout
    pub fn formatieren(&self, format: &str) -> Result<String> {
        match format {
            "json" => serde_json::to_string(self).context("JSON-Ausgabe fehlgeschlagen"),
            _ => {
                let liste = |werte: &[f64]| {
                    werte
                        .iter()
                        .map(|w| w.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                Ok(format!(
                    "{}({}) = {}",
                    self.export,
                    liste(&self.argumente),
                    liste(&self.ergebnisse)
                ))
            }
        }
    }
}

/// Haelt den Runner-Zustand zusammen
pub struct Runner {
    pub config: RunnerConfig,
}

impl Runner {
    /// Erstellt einen neuen Runner aus der gegebenen Konfiguration
    pub fn neu(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Waehlt die Byte-Quelle passend zum Modul-Pfad
    pub fn quelle(&self) -> Box<dyn ByteQuelle> {
        if self.config.modul_ist_text() {
            Box::new(WatQuelle::neu(&self.config.modul.pfad))
        } else {
            Box::new(DateiQuelle::neu(&self.config.modul.pfad))
        }
    }

    /// Fuehrt den konfigurierten Export einmal aus
    ///
    /// Reihenfolge:
    /// 1. Konfiguration pruefen
    /// 2. Import-Tabelle aus den Standard-Gruppen bauen
    /// 3. Modul-Bytes holen (async)
    /// 4. Instanziieren und Export aufrufen (synchron)
    pub async fn ausfuehren(&self) -> Result<Ausfuehrung> {
        self.config.validieren()?;

        let importe = anbieter::importe_fuer(&self.config.importe)?;
        let wirt = ModulWirt::neu(self.config.grenzen.clone())?;
        let quelle = self.quelle();

        tracing::info!(
            quelle = %quelle.beschreibung(),
            export = %self.config.modul.export,
            namensraeume = importe.namensraeume().count(),
            "Runner startet"
        );

        let ergebnisse = wirt
            .laden_und_aufrufen(
                quelle.as_ref(),
                &importe,
                &self.config.modul.export,
                &self.config.modul.argumente,
            )
            .await
            .with_context(|| format!("Ausfuehrung von '{}' fehlgeschlagen", self.config.modul.export))?;

        Ok(Ausfuehrung {
            export: self.config.modul.export.clone(),
            argumente: self.config.modul.argumente.clone(),
            ergebnisse,
        })
    }
}
