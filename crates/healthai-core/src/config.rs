//! Layered configuration and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys split on `__`, e.g. `APP_MODEL__N_TREES`). Every section has
//! defaults, so an empty configuration still yields usable [`Settings`].
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::training::DEFAULT_LABEL_COLUMN;

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load from the current directory, picking the overlay from `RUST_ENV` (default `dev`).
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Load `config.toml` and the overlay for `env_name` from `dir`.
    pub fn load_from(dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    /// Build from an inline TOML document, without files or environment.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let figment = Figment::new().merge(Toml::string(toml));
        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }

    fn validate(&self) -> anyhow::Result<()> {
        let s = self.settings()?;
        if s.model.n_trees == 0 {
            anyhow::bail!("model.n_trees must be at least 1");
        }
        if s.model.min_samples_split < 2 {
            anyhow::bail!("model.min_samples_split must be at least 2");
        }
        if !(s.model.holdout_fraction > 0.0 && s.model.holdout_fraction < 1.0) {
            anyhow::bail!("model.holdout_fraction must be in (0, 1)");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub model: ModelSettings,
    pub chat: ChatSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Resolve every configured path against `base` (after `~`/`$VAR` expansion).
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |p: &mut String| *p = resolve_with_base(base, p.as_str()).to_string_lossy().into_owned();
        resolve(&mut self.data.training);
        for p in [
            &mut self.data.medications,
            &mut self.data.descriptions,
            &mut self.data.diets,
            &mut self.data.precautions,
            &mut self.data.workouts,
            &mut self.data.symptom_severity,
            &mut self.model.path,
        ]
        .into_iter()
        .flatten()
        {
            resolve(p);
        }
        self
    }
}

/// Input tables. Every reference table is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub training: String,
    pub label_column: String,
    pub medications: Option<String>,
    pub descriptions: Option<String>,
    pub diets: Option<String>,
    pub precautions: Option<String>,
    pub workouts: Option<String>,
    pub symptom_severity: Option<String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            training: "data/maladies_symptomes_binary.csv".to_string(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            medications: Some("data/medications.csv".to_string()),
            descriptions: Some("data/description.csv".to_string()),
            diets: Some("data/diets.csv".to_string()),
            precautions: Some("data/precautions_df.csv".to_string()),
            workouts: Some("data/workout_df.csv".to_string()),
            symptom_severity: Some("data/symptom-severity.csv".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Persisted forest; loaded when present, written after training when `save_after_training`.
    pub path: Option<String>,
    pub n_trees: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub save_after_training: bool,
    /// Held-out share for the `evaluate` diagnostic only.
    pub holdout_fraction: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: None,
            n_trees: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            save_after_training: true,
            holdout_fraction: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub model: String,
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub system_instruction: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
            system_instruction: "You are a kind health assistant, not a doctor. Help users understand \
                the HealthAI application and navigate its features. You may give general health advice \
                but always state that you are not a doctor and that the user should consult a \
                healthcare professional for personal medical advice."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 5000 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
