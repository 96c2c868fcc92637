use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use concprobe::args::{Cli, Command, SearchMethod, TargetArgs};
use concprobe::config::{apply_config, load_config, resolve_credential};
use concprobe::error::{AppError, AppResult};
use concprobe::http::{ClientSettings, Credential, HttpExecutor, Target};
use concprobe::search::{BatchProber, SearchSettings, SweepSettings};

use crate::app::{run_search, run_sweep};

/// Validated work for one invocation, built before any network activity.
enum RunPlan {
    Search {
        method: SearchMethod,
        settings: SearchSettings,
    },
    Sweep {
        settings: SweepSettings,
    },
}

pub(crate) fn run() -> AppResult<()> {
    let (mut cli, matches) = parse_args()?;
    let configured = configure(&mut cli, &matches);

    crate::logger::init_logging(cli.target().verbose);

    if let Err(err) = configured {
        tracing::error!("{}", err);
        return Err(err);
    }

    let result = build_runtime().and_then(|runtime| runtime.block_on(run_async(cli)));
    if let Err(err) = result.as_ref() {
        tracing::error!("{}", err);
    }
    result
}

/// Single-threaded runtime: dispatch units interleave only at I/O awaits.
fn build_runtime() -> AppResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(AppError::from)
}

fn parse_args() -> AppResult<(Cli, ArgMatches)> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    Ok((cli, matches))
}

fn configure(cli: &mut Cli, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(cli.target().config.as_deref())? {
        apply_config(cli, matches, &config)?;
    }
    Ok(())
}

fn build_plan(command: &Command) -> AppResult<RunPlan> {
    match command {
        Command::Search(args) => {
            let settings = args.settings();
            settings.validate()?;
            Ok(RunPlan::Search {
                method: args.method,
                settings,
            })
        }
        Command::Sweep(args) => {
            let settings = args.settings();
            settings.validate()?;
            Ok(RunPlan::Sweep { settings })
        }
    }
}

async fn run_async(cli: Cli) -> AppResult<()> {
    let target_args = cli.target();
    let api_key = resolve_credential(&target_args.api_key_env)?;
    let plan = build_plan(&cli.command)?;
    let target = Target::from_parts(
        &target_args.base_url,
        &target_args.endpoint,
        Some(Credential::new(target_args.auth_scheme.as_str(), api_key)),
    )?;

    let executor = HttpExecutor::connect(&target, client_settings(target_args)).await?;
    tracing::debug!("Probing {}", executor.url());
    let prober = BatchProber::new(Arc::new(executor));
    let endpoint = target.url.as_str();

    match plan {
        RunPlan::Search { method, settings } => {
            run_search(&prober, method, &settings, endpoint, target_args.verbose).await?;
        }
        RunPlan::Sweep { settings } => {
            run_sweep(&prober, &settings, endpoint, target_args.timeout).await?;
        }
    }
    Ok(())
}

const fn client_settings(target: &TargetArgs) -> ClientSettings {
    ClientSettings {
        timeout: target.timeout,
        pre_lookup: !target.no_pre_lookup,
    }
}
