use crate::config::Config;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use storefront_editor::{FileKv, PresetStore};

#[derive(Subcommand, Debug)]
pub enum PresetsCommand {
    /// List stored presets
    List,

    /// Write all presets as one JSON document
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Merge presets from an exported document (same names are replaced)
    Import { input: PathBuf },
}

fn open_store(cwd: &Path) -> Result<PresetStore<FileKv>> {
    let config = Config::load(cwd)?;
    Ok(PresetStore::open(FileKv::new(config.presets_dir(cwd)))?)
}

pub fn presets(command: PresetsCommand, cwd: &Path) -> Result<()> {
    match command {
        PresetsCommand::List => {
            let store = open_store(cwd)?;
            if store.is_empty() {
                println!("No presets");
            }
            for preset in store.presets() {
                println!(
                    "{}  {} {}",
                    preset.name.bold(),
                    preset.node.kind.to_string().cyan(),
                    preset.updated_at.to_rfc3339().dimmed()
                );
            }
        }
        PresetsCommand::Export { out } => {
            let store = open_store(cwd)?;
            let json = store.export(Utc::now())?;
            match out {
                Some(path) => {
                    fs::write(&path, json)?;
                    println!("{} {} presets → {}", "✓".green(), store.len(), path.display());
                }
                None => println!("{}", json),
            }
        }
        PresetsCommand::Import { input } => {
            let mut store = open_store(cwd)?;
            let json = fs::read_to_string(&input).with_context(|| format!("Cannot read {}", input.display()))?;
            let imported = store.import(&json, Utc::now())?;
            if imported == 0 {
                println!("{} No presets found in {}", "⚠".yellow(), input.display());
            } else {
                println!("{} Imported {} presets", "✓".green(), imported);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_import_then_export() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.json");
        fs::write(
            &input,
            r#"{ "presets": [{ "name": "Hero", "node": { "id": "h", "type": "row" }, "updatedAt": "2026-03-01T09:00:00Z" }] }"#,
        )
        .unwrap();

        presets(PresetsCommand::Import { input }, dir.path()).unwrap();

        let out = dir.path().join("out.json");
        presets(PresetsCommand::Export { out: Some(out.clone()) }, dir.path()).unwrap();

        let exported: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(exported["presets"][0]["name"], "Hero");
        assert_eq!(open_store(dir.path()).unwrap().names(), vec!["Hero"]);
    }
}
