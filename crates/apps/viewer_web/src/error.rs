use formats::FlightsError;
use scene::SceneError;
use scene::config::ConfigError;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("element '{0}' not found")]
    MissingElement(String),
    #[error("browser window or document unavailable")]
    NoWindow,
    #[error("DOM call failed: {0}")]
    Dom(String),
    #[error("fetching {url} failed: {message}")]
    Fetch { url: String, message: String },
    #[error(transparent)]
    Flights(#[from] FlightsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("texture {name}: {message}")]
    Texture { name: String, message: String },
    #[error("graphics setup failed: {0}")]
    Graphics(String),
}

impl ViewerError {
    pub fn dom(err: JsValue) -> Self {
        ViewerError::Dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
    }
}

impl From<ViewerError> for JsValue {
    fn from(err: ViewerError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Write to the browser console.
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
