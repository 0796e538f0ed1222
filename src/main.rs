/*!
 * probeset-rank
 * Ranks probesets for every configured task, gene list and strategy and
 * cross-validates the selected features.
 *
 * Usage: probeset-rank [CONFIG]
 * CONFIG defaults to probeset-ranker.toml; PROBESET_* variables override it.
 */

use anyhow::{bail, Context, Result};
use probeset_ranker::config::DEFAULT_CONFIG_FILE;
use probeset_ranker::{init_logging, Config, GeneList, Runner, TableLoader};
use std::path::PathBuf;
use std::process::ExitCode;

fn run() -> Result<bool> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut config = Config::load_from_file(&config_path)
        .with_context(|| format!("loading configuration {}", config_path.display()))?;
    config
        .apply_environment_overrides()
        .context("applying environment overrides")?;
    init_logging(config.verbosity);

    let Some(dataset_path) = config.input.dataset.clone() else {
        bail!("no dataset configured in {}", config_path.display());
    };
    let dataset = TableLoader::new(config.input.table.clone())
        .load(&dataset_path)
        .with_context(|| format!("loading dataset {}", dataset_path.display()))?;
    log::info!(
        "Loaded {} samples x {} probesets from {}",
        dataset.num_samples(),
        dataset.num_features(),
        dataset_path.display()
    );

    let gene_lists = config
        .input
        .gene_lists
        .iter()
        .map(|path| GeneList::load(path).with_context(|| format!("loading gene list {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    let trainer = config.trainer.clone();
    let runner = Runner::new(config, trainer).context("preparing run")?;
    let summary = runner.run(&dataset, &gene_lists)?;

    for outcome in &summary.outcomes {
        match (&outcome.measures, &outcome.error) {
            (Some(measures), _) => {
                let values: Vec<String> = measures
                    .iter()
                    .map(|(name, value)| format!("{}={:.4}", name, value))
                    .collect();
                println!(
                    "{}\t{}\t{}\t{}",
                    outcome.task,
                    outcome.gene_list,
                    outcome.strategy,
                    values.join(" ")
                );
            }
            (None, Some(error)) => {
                println!("{}\t{}\t{}\tfailed: {}", outcome.task, outcome.gene_list, outcome.strategy, error);
            }
            (None, None) => {}
        }
    }

    Ok(summary.failed() == 0)
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
