#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read device registry {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid device registry: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("device id {0} is registered twice")]
    DuplicateId(String),
}
