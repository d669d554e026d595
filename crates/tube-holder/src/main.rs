//! Tube holder generator entry point

use std::process::ExitCode;

use tube_cad::{CadKernel, Design, RecordingKernel, default_kernel};
use tube_holder::{HolderConfig, generate};

/// Environment variable holding an optional RON configuration
const CONFIG_ENV: &str = "TUBE_HOLDER_CONFIG";

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tube_holder=debug,tube_cad=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var(CONFIG_ENV) {
        Ok(text) => match HolderConfig::from_ron_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("{}: {}", CONFIG_ENV, e);
                return ExitCode::FAILURE;
            }
        },
        Err(_) => HolderConfig::default(),
    };

    let kernel = select_kernel();
    let mut design = Design::new("Tube Holder");

    match generate(&config, &mut design, kernel.as_ref()) {
        Ok(model) => {
            for (index, feature) in design.features().enumerate() {
                tracing::info!(index, kind = feature.type_name(), name = %feature.name, "Directive");
            }
            tracing::info!(
                kernel = kernel.name(),
                directives = model.directive_count,
                tubes = model.tubes.len(),
                "Done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Use the compiled-in geometry kernel, or record directives without one
fn select_kernel() -> Box<dyn CadKernel> {
    let kernel = default_kernel();
    if kernel.is_available() {
        kernel
    } else {
        tracing::info!("No geometry kernel compiled in, recording directives only");
        Box::new(RecordingKernel::new())
    }
}
