use anyhow::Result;
use dotenvy::dotenv;

use dvtrusted::cli::{Cli, Commands};
use dvtrusted::core::{init_logger, log_configuration, AppConfig};
use dvtrusted::proof::{ProofTask, SubmitOutcome};
use dvtrusted::terminal::{launch_context, TerminalView};
use dvtrusted::App;

/// Terminal host for the Mini App core.
///
/// Parses CLI arguments and dispatches to the matching flow.
///
/// # Errors
/// Returns an error if configuration, logging, or the selected flow fails.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    let config = AppConfig::from_env()?;
    init_logger(&config.log_file_path)?;
    log_configuration(&config);

    let app = App::from_config(config)?;

    match cli.command {
        Commands::Bootstrap { launch } => {
            let mut view = TerminalView::new();
            let session = app.bootstrap(&mut view, &launch_context(&launch)?).await?;
            log::info!("Session ready for {} ({:?})", session.account_id, session.mode);
        }
        Commands::Verify => {
            let mut view = TerminalView::new();
            app.verify_channels(&mut view).await?;
        }
        Commands::Submit {
            launch,
            task,
            title,
            file,
            source,
        } => {
            let mut session_view = TerminalView::new();
            let session = app.bootstrap(&mut session_view, &launch_context(&launch)?).await?;

            let mut handler = app.proof_handler(&session, ProofTask::new(task, title), TerminalView::with_picked_file(file));
            if handler.capture(source.into()).await? {
                match handler.submit_proof().await {
                    SubmitOutcome::Submitted(receipt) => {
                        log::info!("Stored as file_id {}", receipt.upload.file_id);
                    }
                    SubmitOutcome::Failed(e) => anyhow::bail!("upload failed: {}", e),
                    SubmitOutcome::NoFileSelected => {}
                }
            } else {
                anyhow::bail!("no file was picked");
            }
        }
        Commands::PhotoUrl { file_id } => {
            let url = app.photo_url(&file_id).await?;
            println!("{}", url);
        }
    }

    Ok(())
}
