use std::path::PathBuf;
use std::time::Duration;

use secrecy::Secret;

use crate::domain::endpoint::Endpoint;
use crate::domain::submission::FormKind;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub log_level: String,
    /// URL of the page hosting the forms; its query string can turn on debug output.
    #[serde(default)]
    pub page_url: Option<String>,
    pub client: ClientSettings,
    pub forms: FormsSettings,
    pub storage: StorageSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ClientSettings {
    pub timeout_milliseconds: u64,
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct FormsSettings {
    pub newsletter: FormSettings,
    pub contact: FormSettings,
}

impl FormsSettings {
    pub fn get(&self, kind: FormKind) -> &FormSettings {
        match kind {
            FormKind::Newsletter => &self.newsletter,
            FormKind::Contact => &self.contact,
        }
    }
}

/// A form's two possible submission targets, as the page markup carries them.
#[derive(serde::Deserialize, Clone, Debug, Default)]
pub struct FormSettings {
    #[serde(default)]
    pub data_endpoint: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

impl FormSettings {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::resolve(self.data_endpoint.as_deref(), self.action.as_deref())
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub path: PathBuf,
    pub redis_url: Secret<String>,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    Redis,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // E.g. `APP_FORMS__NEWSLETTER__DATA_ENDPOINT=https://...`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
