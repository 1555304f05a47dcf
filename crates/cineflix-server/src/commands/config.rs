use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use cineflix_config::{generate_secret, Config, KeyStore, PathManager};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, config: &Config, paths: &PathManager, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => init_config(force, paths, output),
        ConfigCommands::Show { full } => show_config(full, config, paths, output),
        ConfigCommands::RotateKey => rotate_key(paths, output),
    }
}

fn init_config(force: bool, paths: &PathManager, output: &Output) -> Result<()> {
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create directories: {}", e))?;

    let config_file = paths.config_file();
    if config_file.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
    } else {
        Config::default()
            .save_to_file(&config_file)
            .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;
        output.success(format!("Wrote default configuration to {}", config_file.display()));
    }

    let mut keys = KeyStore::new(paths.keys_file());
    keys.load().map_err(|e| eyre!("Failed to read signing keys: {}", e))?;
    if keys.ensure_key() {
        keys.save().map_err(|e| eyre!("Failed to save signing keys: {}", e))?;
        output.success(format!("Generated token signing key in {}", paths.keys_file().display()));
    }

    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "YOUR_API_KEY" {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

fn show_config(full: bool, config: &Config, paths: &PathManager, output: &Output) -> Result<()> {
    let mut shown = config.clone();
    if !full {
        shown.youtube.api_key = shown.youtube.api_key.as_deref().map(mask_string);
    }

    match output.format() {
        OutputFormat::Human => {
            output.table(
                &["Path", "Location"],
                vec![
                    vec!["Config file".to_string(), paths.config_file().display().to_string()],
                    vec!["Signing keys".to_string(), paths.keys_file().display().to_string()],
                    vec!["Data".to_string(), paths.data_dir().display().to_string()],
                ],
            );
            let rendered = toml::to_string_pretty(&shown).map_err(|e| eyre!("Failed to render config: {}", e))?;
            output.info(rendered);
        }
        _ => output.json(&json!({
            "config_file": paths.config_file(),
            "keys_file": paths.keys_file(),
            "data_dir": paths.data_dir(),
            "config": shown,
        })),
    }
    Ok(())
}

fn rotate_key(paths: &PathManager, output: &Output) -> Result<()> {
    let mut keys = KeyStore::new(paths.keys_file());
    keys.load().map_err(|e| eyre!("Failed to read signing keys: {}", e))?;
    keys.rotate(generate_secret());
    keys.save().map_err(|e| eyre!("Failed to save signing keys: {}", e))?;

    output.success(format!(
        "Rotated token signing key ({} keys retained for verification)",
        keys.signing_keys().len()
    ));
    output.info("Restart the server to start signing with the new key.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("abc"), "***");
        assert_eq!(mask_string("AIzaSyExample"), "AI***le");
        assert_eq!(mask_string("ключ-ютуба"), "кл***ба");
        assert_eq!(mask_string("日本語"), "***");
    }

    #[test]
    fn test_init_then_rotate() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = PathManager::with_base(dir.path());
        let output = Output::new(OutputFormat::Json, true);

        init_config(false, &paths, &output).unwrap();
        assert!(paths.config_file().exists());

        let mut keys = KeyStore::new(paths.keys_file());
        keys.load().unwrap();
        let first = keys.current_key().cloned().unwrap();

        rotate_key(&paths, &output).unwrap();
        let mut keys = KeyStore::new(paths.keys_file());
        keys.load().unwrap();
        assert_eq!(keys.signing_keys().len(), 2);
        assert_eq!(keys.signing_keys()[1], first);
    }
}
