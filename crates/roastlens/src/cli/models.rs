//! The `roastlens models` command for managing the CLIP checkpoint.

use clap::{Args, Subcommand};
use roastlens_core::{ClipEngine, Config};
use std::path::Path;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download the CLIP checkpoint (vision + text encoder + tokenizer)
    Download,

    /// List installed checkpoint files
    List,

    /// Show the checkpoint directory path
    Path,
}

/// One file of the pretrained checkpoint.
struct CheckpointFile {
    label: &'static str,
    remote_path: &'static str,
    local_name: &'static str,
}

/// The fixed pretrained checkpoint this service runs.
const CHECKPOINT_REPO: &str = "Xenova/clip-vit-base-patch32";

const CHECKPOINT_FILES: &[CheckpointFile] = &[
    CheckpointFile {
        label: "Vision encoder",
        remote_path: "onnx/vision_model.onnx",
        local_name: "visual.onnx",
    },
    CheckpointFile {
        label: "Text encoder",
        remote_path: "onnx/text_model.onnx",
        local_name: "text_model.onnx",
    },
    CheckpointFile {
        label: "Tokenizer",
        remote_path: "tokenizer.json",
        local_name: "tokenizer.json",
    },
];

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    let checkpoint_dir = ClipEngine::checkpoint_dir(&config.model, &config.model_dir());

    match args.command {
        ModelsCommand::Download => {
            let client = reqwest::Client::new();
            download_checkpoint(&client, &checkpoint_dir).await?;
            tracing::info!("All downloads complete.");
        }

        ModelsCommand::List => {
            if !checkpoint_dir.exists() {
                println!("No checkpoint installed.");
                println!("Run `roastlens models download` to download the CLIP checkpoint.");
                return Ok(());
            }

            println!("Checkpoint: {}", CHECKPOINT_REPO);
            println!("  Directory: {}\n", checkpoint_dir.display());

            for file in CHECKPOINT_FILES {
                let status = if checkpoint_dir.join(file.local_name).exists() {
                    "ready"
                } else {
                    "not installed"
                };
                println!("    - {:20} {}", file.local_name, status);
            }

            if ClipEngine::model_exists(&config.model, &config.model_dir()) {
                println!("\nAll files present; the /analyze endpoint will be available.");
            } else {
                println!("\nFiles missing; the server will start but /analyze will return 503.");
            }
        }

        ModelsCommand::Path => {
            println!("{}", checkpoint_dir.display());
        }
    }

    Ok(())
}

/// Download all checkpoint files. Skips files already present.
async fn download_checkpoint(
    client: &reqwest::Client,
    checkpoint_dir: &Path,
) -> anyhow::Result<()> {
    for file in CHECKPOINT_FILES {
        let dest = checkpoint_dir.join(file.local_name);

        if dest.exists() {
            tracing::info!("{} already exists at {:?}", file.label, dest);
            continue;
        }

        std::fs::create_dir_all(checkpoint_dir)?;

        let url = format!(
            "https://huggingface.co/{}/resolve/main/{}",
            CHECKPOINT_REPO, file.remote_path
        );

        tracing::info!("Downloading {}...", file.label);
        tracing::info!("  Source: {}", url);
        tracing::info!("  Destination: {:?}", dest);

        download_file(client, &url, &dest).await?;

        let file_size = std::fs::metadata(&dest)?.len();
        tracing::info!(
            "  {} complete ({:.1} MB)",
            file.label,
            file_size as f64 / (1024.0 * 1024.0)
        );
    }

    Ok(())
}

/// Download a file from a URL to a local path, streaming to disk.
async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> anyhow::Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let response = client
        .get(url)
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
