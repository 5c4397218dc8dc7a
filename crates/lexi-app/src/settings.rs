use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use lexi_config::Config;

use crate::cli::CommonArgs;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "lexi.json";

fn load_config_file(path: &Path) -> anyhow::Result<Config> {
    let file = File::open(path).with_context(|| format!("Failed to open config {}", path.display()))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Explicit file, else `lexi.json` if present, else defaults; the
/// environment overrides whichever was loaded
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(load_config_file(path)?.with_env()),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Ok(load_config_file(Path::new(DEFAULT_CONFIG_FILE))?.with_env())
        }
        None => Ok(Config::new()),
    }
}

/// Command-line flags win over file and environment
pub fn apply_overrides(config: &mut Config, args: &CommonArgs) {
    if let Some(model) = &args.model {
        config.ollama.model = model.clone();
    }
    if let Some(batch) = args.batch {
        config.generation.batch_size = batch.max(1);
    }
    if let Some(dir) = &args.raw_dir {
        config.paths.raw_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.paths.output_dir = dir.clone();
    }
}
