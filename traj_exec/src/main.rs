//! Trajectory editor executable entry point.
//!
//! # Architecture
//!
//! - Load the trajectory to edit and the track boundaries
//! - Main loop:
//!     - Acquire the next event, either from an edit script or the console
//!     - Hand it to the editing session
//!     - Report the result
//!
//! The editor has no display of its own, positions are given in the local frame of the loaded
//! trajectory. The console accepts the commands `select X Y`, `drag X Y`, `insert X Y`,
//! `delete`, `speed DELTA_KPH`, `undo`, `redo`, `save [PATH]` and `quit`, the speed shortcuts
//! `[`, `]`, `{` and `}`, or a JSON event.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use traj_if::EditEvent;
use traj_lib::{
    boundary::Boundaries,
    coords,
    edit::{self, EventOutcome, TrajSession},
    traj::Trajectory,
};
use util::{
    logger::{logger_init, LevelFilter},
    script_interpreter::ScriptInterpreter,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const PROMPT: &str = "traj_edit $ ";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Interactive trajectory editor
#[derive(Debug, StructOpt)]
#[structopt(name = "traj_edit")]
struct Args {
    /// The trajectory CSV file to edit
    #[structopt(parse(from_os_str))]
    traj: PathBuf,

    /// Directory holding left.csv, right.csv and/or centerline.csv
    #[structopt(long, parse(from_os_str))]
    bounds_dir: Option<PathBuf>,

    /// Single boundary CSV file with a `role` column
    #[structopt(long, parse(from_os_str), conflicts_with = "bounds_dir")]
    bounds_csv: Option<PathBuf>,

    /// Edit script to run instead of the interactive console
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Where `save` writes to when no path is given
    #[structopt(short, long, parse(from_os_str))]
    out: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Where editor events come from.
enum EventSource {
    Script(ScriptInterpreter),
    Console(DefaultEditor),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("traj_edit", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Trace, LevelFilter::Info, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Trajectory Editor\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let coord_params: coords::Params =
        util::params::load("coords.toml").wrap_err("Could not load coordinate params")?;

    let mut edit_params: edit::Params =
        util::params::load("editor.toml").wrap_err("Could not load editor params")?;

    if let Some(out) = args.out.as_ref() {
        edit_params.default_save_path = out.clone();
    }

    info!("Parameters loaded");

    // ---- LOAD DATA ----

    let traj = Trajectory::load(&args.traj, &coord_params)
        .wrap_err_with(|| format!("Failed to load the trajectory from {:?}", args.traj))?;

    info!("Loaded {} points from {:?}", traj.len(), args.traj);

    // Boundaries share the trajectory's frame
    let bounds_params = match traj.origin() {
        Some(o) => coord_params.with_origin(o),
        None => coord_params.clone(),
    };

    let bounds = match (args.bounds_dir.as_ref(), args.bounds_csv.as_ref()) {
        (Some(dir), _) => Boundaries::load_dir(dir, &bounds_params)
            .wrap_err("Failed to load the boundaries")?,
        (None, Some(path)) => Boundaries::load_csv(path, &bounds_params)
            .wrap_err("Failed to load the boundaries")?,
        (None, None) => {
            info!("No boundaries given");
            Boundaries::default()
        }
    };

    // ---- INITIALISE EVENT SOURCE ----

    let mut source = match args.script.as_ref() {
        Some(path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!("Loaded script contains {} events\n", si.get_num_events());

            EventSource::Script(si)
        }
        None => {
            info!("No script provided, reading events from the console\n");
            EventSource::Console(DefaultEditor::new().wrap_err("Failed to start the console")?)
        }
    };

    let mut traj_session = TrajSession::new(traj, &bounds, edit_params);

    // ---- MAIN LOOP ----

    while let Some(event) = source.next_event(traj_session.params())? {
        if event.is_edit() {
            info!("Edit event: {:?}", event);
        }

        match traj_session.handle(&event) {
            Ok(EventOutcome::Continue) => (),
            Ok(EventOutcome::Quit) => break,
            Err(e) => warn!("{}", e),
        }
    }

    if traj_session.is_dirty() {
        warn!("Exiting with unsaved edits");
    }

    info!("End of session");

    Ok(())
}

impl EventSource {
    /// Get the next event, or `None` when there are no more.
    fn next_event(&mut self, params: &edit::Params) -> Result<Option<EditEvent>, Report> {
        match self {
            EventSource::Script(si) => {
                let event = si.next_event();
                if event.is_none() {
                    info!("End of script reached");
                }
                Ok(event)
            }
            EventSource::Console(rl) => loop {
                let line = match rl.readline(PROMPT) {
                    Ok(l) => l,
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
                    Err(e) => {
                        return Err(Report::new(e).wrap_err("Failed to read from the console"))
                    }
                };

                if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str())
                    .wrap_err("Failed to update the console history")?;

                match console_event(&line, params) {
                    Ok(e) => return Ok(Some(e)),
                    Err(e) => warn!("{}", e),
                }
            },
        }
    }
}

/// Parse a console line, expanding the speed shortcuts.
fn console_event(line: &str, params: &edit::Params) -> Result<EditEvent, traj_if::EventParseError> {
    let delta_kph = match line.trim() {
        "[" => -params.speed_step_kph,
        "]" => params.speed_step_kph,
        "{" => -params.speed_big_step_kph,
        "}" => params.speed_big_step_kph,
        l => return EditEvent::from_console(l),
    };

    Ok(EditEvent::AdjustSpeed { delta_kph })
}
