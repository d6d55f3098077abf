//! Shop catalog configuration loaded from `config.toml`.
//!
//! The mechanic roster and the catalog of services offered are data, not code: they
//! are read from the `[shop]` table and fall back to the built-in defaults when the
//! file or the table is absent.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_MECHANICS: [&str; 3] = ["Wellington", "João Carlos", "Germano"];

const DEFAULT_SERVICES: [&str; 26] = [
    "Troca de óleo",
    "Troca de filtro de ar",
    "Troca de filtro de combustível",
    "Revisão completa",
    "Alinhamento e balanceamento",
    "Troca de pastilhas de freio",
    "Troca de amortecedor",
    "Vazamento de óleo",
    "Vazamento na caixa de marcha",
    "Diagnóstico eletrônico",
    "Troca da correia dentada",
    "Problemas de injeção eletrônica",
    "Falha de combustível",
    "Motor falhando",
    "Superaquecimento",
    "Limpador de para-brisa com defeito",
    "Ruído na suspensão",
    "Troca de embreagem",
    "Troca de bateria",
    "Troca de cabo de vela",
    "Troca de bobina",
    "Troca de termostato",
    "Troca de bomba d'água",
    "Revisão de freios",
    "Limpeza de bicos",
    "Pane elétrica",
];

/// Structure of the whole `config.toml` file
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Shop catalog; optional so an empty file is valid
    #[serde(default)]
    pub shop: ShopConfig,
}

/// Mechanic roster and service catalog
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Shop name shown in bot replies
    pub name: String,
    /// Mechanics who can be assigned to an order
    pub mechanics: Vec<String>,
    /// Services offered, in display order
    pub services: Vec<String>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            name: "JCAR".to_string(),
            mechanics: DEFAULT_MECHANICS.iter().map(ToString::to_string).collect(),
            services: DEFAULT_SERVICES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ShopConfig {
    /// Whether `name` is on the mechanic roster (case-insensitive).
    #[must_use]
    pub fn is_known_mechanic(&self, name: &str) -> bool {
        contains_ignore_case(&self.mechanics, name)
    }

    /// Whether `service` is in the catalog (case-insensitive).
    #[must_use]
    pub fn is_known_service(&self, service: &str) -> bool {
        contains_ignore_case(&self.services, service)
    }

    /// Returns the catalog spelling of `service`, if it is in the catalog.
    #[must_use]
    pub fn canonical_service(&self, service: &str) -> Option<&str> {
        let wanted = service.trim().to_lowercase();
        self.services
            .iter()
            .find(|s| s.to_lowercase() == wanted)
            .map(String::as_str)
    }
}

fn contains_ignore_case(items: &[String], value: &str) -> bool {
    let wanted = value.trim().to_lowercase();
    items.iter().any(|item| item.to_lowercase() == wanted)
}

/// Parses a `config.toml` document.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a field has the wrong type.
pub fn parse_config(contents: &str) -> Result<ConfigFile> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the shop configuration from a TOML file. A missing file yields the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_shop_config<P: AsRef<Path>>(path: P) -> Result<ShopConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file {:?} not found, using the built-in shop catalog",
            path
        );
        return Ok(ShopConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;
    Ok(parse_config(&contents)?.shop)
}
