//! Strongly typed run configuration, read from JSON.
//!
//! Every struct fills unspecified fields from the constants in the crate
//! root. Policy and schedule variants are closed `kind`-tagged enums, so an
//! unknown kind fails at load time rather than mid-run.
mod actor;
mod client;
mod run;
mod server;

pub use actor::*;
pub use client::*;
pub use run::*;
pub use server::*;

/// Read a JSON config file. Callers validate the concrete type.
pub fn load<T>(path: &std::path::Path) -> Result<T, crate::Error>
where
    T: serde::de::DeserializeOwned,
{
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| crate::Error::Configuration(format!("{}: {}", path.display(), e)))
}
