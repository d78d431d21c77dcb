mod config;
mod shell;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use ipresent_client::HttpSubmitter;
use ipresent_core::roster::{self, Roster};
use ipresent_core::{
    normalize, ImageSource, WorkflowController, WorkflowError, SLOT_COUNT,
    SUBMISSION_FAILED_MESSAGE,
};
use ipresent_hw::{Camera, MediaCaptureAdapter, V4l2Opener};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ipresent", version, about = "Classroom attendance by face recognition")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true, env = "IPRESENT_CONFIG")]
    config: Option<PathBuf>,

    /// Recognition backend base URL
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// V4L2 device used in camera mode
    #[arg(long, global = true)]
    camera_device: Option<String>,

    /// Seconds to wait for the backend before giving up
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive capture session (default)
    Run,
    /// Submit four photos in one go and print the roster
    Submit {
        /// Your name
        #[arg(short, long)]
        name: String,
        /// Subject name
        #[arg(short, long)]
        subject: String,
        /// Exactly four classroom photos
        #[arg(num_args = 4, required = true)]
        photos: Vec<PathBuf>,
        /// Print the records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List V4L2 capture devices
    Devices,
    /// Capture one frame and write it as JPEG
    TestCamera {
        /// Output file
        #[arg(short, long, default_value = "ipresent-test.jpg")]
        output: PathBuf,
    },
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(device) = &self.camera_device {
            config.camera_device = device.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.submit_timeout_secs = secs;
        }
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let mut controller = controller(&config)?;
            shell::run(&mut controller).await?;
        }
        Commands::Submit {
            name,
            subject,
            photos,
            json,
        } => submit_once(&config, name, subject, photos, json).await?,
        Commands::Devices => {
            let devices = Camera::list_devices();
            if devices.is_empty() {
                println!("No V4L2 capture devices found");
            }
            for dev in devices {
                println!("{}  {} ({}, {})", dev.path, dev.name, dev.driver, dev.bus);
            }
        }
        Commands::TestCamera { output } => test_camera(&config, &output).await?,
    }

    Ok(())
}

fn controller(config: &Config) -> Result<WorkflowController<HttpSubmitter, V4l2Opener>> {
    let submitter = HttpSubmitter::new(&config.backend_url, config.submit_timeout())
        .context("building HTTP client")?;
    let opener = V4l2Opener::new(config.camera_device.clone(), config.warmup_frames);
    Ok(WorkflowController::new(submitter, opener))
}

async fn submit_once(
    config: &Config,
    name: String,
    subject: String,
    photos: Vec<PathBuf>,
    json: bool,
) -> Result<()> {
    if photos.len() != SLOT_COUNT {
        bail!("expected {SLOT_COUNT} photos, got {}", photos.len());
    }

    let mut controller = controller(config)?;
    for path in &photos {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        controller
            .upload(bytes)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    if !controller.proceed_to_info() {
        bail!("photo slots are not complete");
    }
    controller.set_operator_name(name)?;
    controller.set_subject_name(subject)?;

    let result = tokio::select! {
        result = controller.submit() => result,
        _ = tokio::signal::ctrl_c() => bail!("submission abandoned"),
    };
    if let Err(e) = result {
        return Err(user_facing(e, controller.session().last_error()));
    }

    let session = controller.session();
    let records = session.records();
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        println!("{}", roster::header(records.len(), session.info()));
        print!("{}", Roster::from_records(records));
    }
    Ok(())
}

/// Submission failures surface as the session's generic message. The
/// failure kind is logged by the workflow, never printed.
fn user_facing(err: WorkflowError, last_error: Option<&str>) -> anyhow::Error {
    match err {
        WorkflowError::Submission(_) => {
            anyhow!("{}", last_error.unwrap_or(SUBMISSION_FAILED_MESSAGE))
        }
        other => other.into(),
    }
}

async fn test_camera(config: &Config, output: &Path) -> Result<()> {
    let opener = V4l2Opener::new(config.camera_device.clone(), config.warmup_frames);
    let mut adapter = MediaCaptureAdapter::new(opener);
    adapter
        .activate()
        .await
        .with_context(|| format!("opening {}", config.camera_device))?;

    let frame = adapter.capture_frame()?;
    println!(
        "Captured {}x{} frame (sequence {})",
        frame.width, frame.height, frame.sequence
    );
    adapter.deactivate();

    let jpeg = normalize(&ImageSource::Frame(frame))?;
    tokio::fs::write(output, jpeg.bytes())
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {} ({} bytes)", output.display(), jpeg.len());
    Ok(())
}
