//! Line-oriented front-end for the capture workflow.

use anyhow::{anyhow, bail, Result};
use ipresent_core::roster::{self, Roster};
use ipresent_core::{
    InputMode, SessionState, Submitter, WorkflowController, WorkflowError, WorkflowState,
    SLOT_COUNT,
};
use ipresent_hw::DeviceOpener;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "\
Capturing:
  mode upload|camera     choose where photos come from
  camera                 retry enabling the camera
  focus <1-4>            target a slot for the next photo
  upload [<1-4>] <path>  load an image file into a slot
  capture                take a photo with the camera
  remove <1-4>           empty a slot
  continue               go on once all four slots are filled
Session details:
  name <text>            operator name
  subject <text>         subject name
  back                   return to the photos
  submit                 send for recognition (Ctrl-C abandons)
Results:
  reset                  start a new scan
Always:
  status, help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Status,
    Mode(InputMode),
    EnableCamera,
    Focus(usize),
    Upload { slot: Option<usize>, path: PathBuf },
    Capture,
    Remove(usize),
    Continue,
    Name(String),
    Subject(String),
    Back,
    Submit,
    Reset,
    Quit,
}

/// Parse one input line. Slot numbers are 1-based on input and 0-based in
/// the returned command. Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "status" | "ls" => ShellCommand::Status,
        "mode" => match rest {
            "upload" => ShellCommand::Mode(InputMode::Upload),
            "camera" | "webcam" => ShellCommand::Mode(InputMode::Camera),
            other => bail!("unknown mode '{other}' (expected upload or camera)"),
        },
        "camera" => ShellCommand::EnableCamera,
        "focus" => ShellCommand::Focus(slot_number(rest)?),
        "upload" => {
            if rest.is_empty() {
                bail!("usage: upload [<1-4>] <path>");
            }
            match rest.split_once(char::is_whitespace) {
                Some((first, path)) if first.parse::<usize>().is_ok() => ShellCommand::Upload {
                    slot: Some(slot_number(first)?),
                    path: PathBuf::from(path.trim()),
                },
                _ => ShellCommand::Upload {
                    slot: None,
                    path: PathBuf::from(rest),
                },
            }
        }
        "capture" | "snap" => ShellCommand::Capture,
        "remove" | "rm" => ShellCommand::Remove(slot_number(rest)?),
        "continue" | "next" => ShellCommand::Continue,
        "name" => ShellCommand::Name(rest.to_string()),
        "subject" => ShellCommand::Subject(rest.to_string()),
        "back" => ShellCommand::Back,
        "submit" | "process" => ShellCommand::Submit,
        "reset" | "new" => ShellCommand::Reset,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => bail!("unknown command '{other}', try 'help'"),
    };
    Ok(Some(command))
}

fn slot_number(text: &str) -> Result<usize> {
    let n: usize = text
        .trim()
        .parse()
        .map_err(|_| anyhow!("expected a slot number 1-{SLOT_COUNT}, got '{text}'"))?;
    if !(1..=SLOT_COUNT).contains(&n) {
        bail!("slot must be between 1 and {SLOT_COUNT}, got {n}");
    }
    Ok(n - 1)
}

/// Read commands from stdin until `quit`, end of input, or Ctrl-C.
pub async fn run<S, O>(controller: &mut WorkflowController<S, O>) -> Result<()>
where
    S: Submitter,
    O: DeviceOpener,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", render(controller.session(), controller.camera_active()));
    println!("Type 'help' for commands.");

    loop {
        print!("{}> ", prompt(controller.state()));
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        if let Err(e) = execute(controller, command).await {
            println!("{}", describe(&e));
        }
    }

    controller.shutdown();
    Ok(())
}

/// Apply one command and print the resulting view.
pub async fn execute<S, O>(
    controller: &mut WorkflowController<S, O>,
    command: ShellCommand,
) -> Result<(), WorkflowError>
where
    S: Submitter,
    O: DeviceOpener,
{
    match command {
        ShellCommand::Help => {
            println!("{HELP}");
            return Ok(());
        }
        ShellCommand::Status | ShellCommand::Quit => {}
        ShellCommand::Mode(mode) => controller.set_input_mode(mode).await?,
        ShellCommand::EnableCamera => controller.enable_camera().await?,
        ShellCommand::Focus(slot) => controller.select_slot(slot)?,
        ShellCommand::Upload { slot, path } => {
            if let Some(slot) = slot {
                controller.select_slot(slot)?;
            }
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let filled = controller.upload(bytes)?;
                    println!("Photo {} loaded from {}", filled + 1, path.display());
                }
                Err(e) => println!("Cannot read {}: {e}", path.display()),
            }
        }
        ShellCommand::Capture => {
            let filled = controller.capture_photo()?;
            println!("Photo {} captured", filled + 1);
        }
        ShellCommand::Remove(slot) => controller.remove_photo(slot)?,
        ShellCommand::Continue => {
            if !controller.proceed_to_info() {
                println!(
                    "All {SLOT_COUNT} photos are needed first ({}/{SLOT_COUNT} completed)",
                    controller.session().slots().completed_count()
                );
            }
        }
        ShellCommand::Name(name) => controller.set_operator_name(name)?,
        ShellCommand::Subject(subject) => controller.set_subject_name(subject)?,
        ShellCommand::Back => {
            controller.back();
        }
        ShellCommand::Submit => {
            println!("Processing images, this might take a moment...");
            let result = tokio::select! {
                result = controller.submit() => result,
                _ = tokio::signal::ctrl_c() => {
                    println!("Submission abandoned");
                    Ok(())
                }
            };
            // Validation and submission failures surface through last_error.
            if let Err(e) = result {
                tracing::debug!(error = %e, "submit did not complete");
            }
        }
        ShellCommand::Reset => {
            controller.reset();
        }
    }
    println!("{}", render(controller.session(), controller.camera_active()));
    Ok(())
}

fn prompt(state: WorkflowState) -> &'static str {
    match state {
        WorkflowState::Capturing => "photos",
        WorkflowState::CollectingInfo => "details",
        WorkflowState::Submitting => "processing",
        WorkflowState::ShowingResults => "results",
    }
}

/// User-facing text for a rejected command.
pub fn describe(error: &WorkflowError) -> String {
    match error {
        WorkflowError::Normalize(e) => format!("That file could not be used as a photo: {e}"),
        WorkflowError::Capture(e) => format!("Camera disabled: {e}. Upload mode still works."),
        WorkflowError::CameraInactive => "Enable the camera first ('mode camera').".to_string(),
        other => other.to_string(),
    }
}

/// Text view of the session for the current screen.
pub fn render(session: &SessionState, camera_active: bool) -> String {
    let mut out = String::new();
    match session.state() {
        WorkflowState::Capturing => render_capture(session, camera_active, &mut out),
        WorkflowState::CollectingInfo | WorkflowState::Submitting => render_info(session, &mut out),
        WorkflowState::ShowingResults => {
            let records = session.records();
            out.push_str("Attendance Results\n");
            out.push_str(&roster::header(records.len(), session.info()));
            out.push('\n');
            out.push_str(&Roster::from_records(records).to_string());
        }
    }
    out.trim_end().to_string()
}

fn render_capture(session: &SessionState, camera_active: bool, out: &mut String) {
    let slots = session.slots();
    let mode = match session.input_mode() {
        InputMode::Upload => "upload",
        InputMode::Camera if camera_active => "camera",
        InputMode::Camera if session.camera_error().is_some() => "camera (disabled)",
        InputMode::Camera => "camera (off, type 'camera' to enable)",
    };
    out.push_str(&format!("Photos ({mode})\n"));
    for index in 0..SLOT_COUNT {
        let marker = if index == slots.focus() { '>' } else { ' ' };
        let content = match slots.get(index) {
            Some(image) => format!(
                "{}x{} jpeg, {} KB",
                image.width(),
                image.height(),
                image.len().div_ceil(1024)
            ),
            None => "empty".to_string(),
        };
        out.push_str(&format!("{marker} [{}] {content}\n", index + 1));
    }
    out.push_str(&format!("{}/{SLOT_COUNT} completed", slots.completed_count()));
    if slots.is_complete() {
        out.push_str(", type 'continue'");
    }
    out.push('\n');
}

fn render_info(session: &SessionState, out: &mut String) {
    let info = session.info();
    out.push_str("Enter Information\n");
    if let Some(error) = session.last_error() {
        out.push_str(&format!("! {error}\n"));
    }
    out.push_str(&format!("  Your Name:    {}\n", info.operator_name));
    out.push_str(&format!("  Subject Name: {}\n", info.subject_name));
}
