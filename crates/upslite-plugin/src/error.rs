use thiserror::Error;
use upslite_hal::HalError;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Fuel gauge error: {0}")]
    Hal(#[from] HalError),

    #[error("Failed to render view: {0}")]
    Render(String),
}
