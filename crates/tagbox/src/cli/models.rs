//! The `tagbox models` command for managing model files.

use clap::{Args, Subcommand};
use std::path::Path;

use tagbox_core::config::hub_token;
use tagbox_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download the WD tagger model and the caption tokenizer
    Download,

    /// List installed models
    List,

    /// Show model directory path
    Path,
}

/// A file to fetch from the hub.
struct RemoteFile {
    repo: &'static str,
    remote_path: &'static str,
    local_name: &'static str,
}

/// WD tagger files, placed under `{model_dir}/{variant}/`.
const WD_FILES: &[RemoteFile] = &[
    RemoteFile {
        repo: "SmilingWolf/wd-v1-4-moat-tagger-v2",
        remote_path: "model.onnx",
        local_name: "model.onnx",
    },
    RemoteFile {
        repo: "SmilingWolf/wd-v1-4-moat-tagger-v2",
        remote_path: "selected_tags.csv",
        local_name: "selected_tags.csv",
    },
];

/// Caption tokenizer, placed directly under the model directory.
const TOKENIZER_FILE: RemoteFile = RemoteFile {
    repo: "openai/clip-vit-base-patch32",
    remote_path: "tokenizer.json",
    local_name: "tokenizer.json",
};

/// Status of each model file on disk.
pub struct InstalledModels {
    pub wd_model: bool,
    pub wd_vocabulary: bool,
    pub tokenizer: bool,
}

/// Check which models are currently installed.
pub fn check_installed(config: &Config) -> InstalledModels {
    let model_dir = config.model_dir();
    let variant_dir = model_dir.join(&config.wd_tagger.model);

    InstalledModels {
        wd_model: variant_dir.join("model.onnx").exists(),
        wd_vocabulary: variant_dir.join("selected_tags.csv").exists(),
        tokenizer: model_dir.join("tokenizer.json").exists(),
    }
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::Download => {
            // Hub downloads are authenticated; a missing token is fatal
            // before any network traffic happens.
            let token = hub_token()?;
            let client = reqwest::Client::new();

            let variant_dir = config.model_dir().join(&config.wd_tagger.model);
            for file in WD_FILES {
                download_if_missing(&client, &token, file, &variant_dir).await?;
            }
            download_if_missing(&client, &token, &TOKENIZER_FILE, &config.model_dir()).await?;

            tracing::info!("All downloads complete.");
        }

        ModelsCommand::List => {
            let installed = check_installed(&config);
            let model_dir = config.model_dir();

            println!("Installed models:");
            println!("  Directory: {}\n", model_dir.display());

            println!("  WD tagger ({}):", config.wd_tagger.model);
            println!("    - {:24} {}", "model.onnx", status(installed.wd_model));
            println!(
                "    - {:24} {}",
                "selected_tags.csv",
                status(installed.wd_vocabulary)
            );

            println!("\n  Caption tokenizer:");
            println!(
                "    - {:24} {}",
                "tokenizer.json",
                status(installed.tokenizer)
            );

            println!("\n  Classifier:");
            println!(
                "    - {:24} served at {}",
                config.classifier.model, config.classifier.endpoint
            );
        }

        ModelsCommand::Path => {
            println!("{}", config.model_dir().display());
        }
    }

    Ok(())
}

fn status(installed: bool) -> &'static str {
    if installed {
        "ready"
    } else {
        "not installed"
    }
}

/// Download a hub file into `dest_dir` unless it is already present.
async fn download_if_missing(
    client: &reqwest::Client,
    token: &str,
    file: &RemoteFile,
    dest_dir: &Path,
) -> anyhow::Result<()> {
    let dest = dest_dir.join(file.local_name);
    if dest.exists() {
        tracing::info!("{} already exists at {:?}", file.local_name, dest);
        return Ok(());
    }

    std::fs::create_dir_all(dest_dir)?;

    let url = format!(
        "https://huggingface.co/{}/resolve/main/{}",
        file.repo, file.remote_path
    );
    tracing::info!("Downloading {}...", file.local_name);
    tracing::info!("  Source: {}", url);
    tracing::info!("  Destination: {:?}", dest);

    download_file(client, token, &url, &dest).await?;

    let file_size = std::fs::metadata(&dest)?.len();
    tracing::info!(
        "  {} complete ({:.1} MB)",
        file.local_name,
        file_size as f64 / (1024.0 * 1024.0)
    );
    Ok(())
}

/// Download a file from a URL to a local path, streaming to disk.
async fn download_file(
    client: &reqwest::Client,
    token: &str,
    url: &str,
    dest: &Path,
) -> anyhow::Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let response = client
        .get(url)
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed: {e}"))?;

    let total_size = response.content_length();
    if let Some(size) = total_size {
        tracing::info!("  Size: {:.1} MB", size as f64 / (1024.0 * 1024.0));
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(total) = total_size {
            if downloaded % (50 * 1024 * 1024) < chunk.len() as u64 {
                tracing::info!(
                    "  Progress: {:.0}%",
                    downloaded as f64 / total as f64 * 100.0
                );
            }
        }
    }

    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_installed_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();

        let installed = check_installed(&config);
        assert!(!installed.wd_model);
        assert!(!installed.wd_vocabulary);
        assert!(!installed.tokenizer);
    }

    #[test]
    fn test_check_installed_sees_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();

        let variant_dir = dir.path().join(&config.wd_tagger.model);
        std::fs::create_dir_all(&variant_dir).unwrap();
        std::fs::write(variant_dir.join("model.onnx"), b"x").unwrap();
        std::fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();

        let installed = check_installed(&config);
        assert!(installed.wd_model);
        assert!(!installed.wd_vocabulary);
        assert!(installed.tokenizer);
    }
}
