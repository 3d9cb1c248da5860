//! # Speed profile correction executable
//!
//! Reads a trajectory, slows it down into its curves and back up out of them, and writes the
//! corrected trajectory out with every other column untouched.
//!
//! The per point curvature and speeds are archived into the session directory for later
//! inspection.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use traj_lib::{coords, curv, speed_prof, traj::Trajectory};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    maths::ms_to_kph,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Batch speed profile correction
#[derive(Debug, StructOpt)]
#[structopt(name = "speed_correct")]
struct Args {
    /// The trajectory CSV file to correct
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Where to write the corrected trajectory
    #[structopt(parse(from_os_str))]
    output: PathBuf,

    /// Parameter file to use instead of params/speed_prof.toml
    #[structopt(short, long, parse(from_os_str))]
    params: Option<PathBuf>,
}

/// Contents of the speed profile parameter file.
#[derive(Debug, Deserialize)]
struct Params {
    curv: curv::Params,
    correct: speed_prof::Params,
}

/// One archived row per trajectory point.
#[derive(Debug, Serialize)]
struct CorrectionRecord {
    index: usize,

    /// Units: 1/meters
    curvature_m: f64,

    in_curve: bool,

    original_speed_ms: f64,

    corrected_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("speed_correct", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Trace, LevelFilter::Info, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Speed Profile Correction\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let params: Params = match args.params.as_ref() {
        Some(p) => util::params::load_path(p),
        None => util::params::load("speed_prof.toml"),
    }
    .wrap_err("Could not load speed profile params")?;

    let coord_params: coords::Params =
        util::params::load("coords.toml").wrap_err("Could not load coordinate params")?;

    info!("Parameters loaded");

    // ---- CORRECT ----

    let traj = Trajectory::load(&args.input, &coord_params)
        .wrap_err_with(|| format!("Failed to load the trajectory from {:?}", args.input))?;

    info!("Loaded {} points from {:?}", traj.len(), args.input);

    let curvature = curv::estimate(&traj.positions_m(), &params.curv);
    let original_ms = traj.speeds_ms();

    let (corrected_ms, report) = speed_prof::correct(&curvature, &original_ms, &params.correct)
        .wrap_err("Failed to correct the speed profile")?;

    info!(
        "Found {} curve region(s), changed {} of {} speeds",
        report.num_regions,
        report.num_changed,
        traj.len()
    );
    if !corrected_ms.is_empty() {
        info!(
            "Corrected speeds range from {:.1} to {:.1} km/h",
            ms_to_kph(report.min_speed_ms),
            ms_to_kph(report.max_speed_ms)
        );
    }

    // ---- ARCHIVE ----

    let mut archiver =
        Archiver::from_path(&session, "correction.csv").wrap_err("Failed to create the archive")?;

    let in_curve = speed_prof::classify(&curvature, params.correct.curvature_threshold);

    for (index, ((k, c), (o, v))) in curvature
        .iter()
        .zip(in_curve.iter())
        .zip(original_ms.iter().zip(corrected_ms.iter()))
        .enumerate()
    {
        archiver
            .serialise(CorrectionRecord {
                index,
                curvature_m: *k,
                in_curve: *c,
                original_speed_ms: *o,
                corrected_speed_ms: *v,
            })
            .wrap_err("Failed to archive the correction")?;
    }
    archiver.flush().wrap_err("Failed to archive the correction")?;

    debug!("Correction archived to {:?}", archiver.path());

    // ---- SAVE ----

    traj.with_speeds(corrected_ms)
        .wrap_err("Failed to apply the corrected speeds")?
        .save(&args.output)
        .wrap_err_with(|| format!("Failed to save the trajectory to {:?}", args.output))?;

    info!("Corrected trajectory saved to {:?}", args.output);

    Ok(())
}
