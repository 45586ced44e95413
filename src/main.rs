use std::sync::Arc;

use potability_service::config::Config;
use potability_service::inference::Predictor;
use potability_service::logging::{self, Component};
use potability_service::server::{self, AppState};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_path) = Config::from_env()?;

    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.console_timestamps,
    );
    logging::info(
        Component::System,
        None,
        &format!(
            "💧 Water Quality Predictor starting (config: {}, feature set: {})",
            config_path.display(),
            config.model.feature_set
        ),
    );

    // Artifacts are loaded once; a broken artifact stops the service here.
    let predictor = match Predictor::load(&config.model) {
        Ok(p) => p,
        Err(e) => {
            logging::error(Component::Model, None, &e.to_string());
            return Err(e.into());
        }
    };

    server::run(Arc::new(AppState::new(config, predictor)))
}
