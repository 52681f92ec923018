//! Trainer Binary
//!
//! Runs a coordinator and a pool of self-play actors in one process.
//! Type "Q" + Enter (or set TRAIN_DURATION) to stop gracefully.
//!
//! Usage: trainer <experiment> --client client.json [--config server.json]
use alphacuber::*;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(about = "self-play training of neural branching heuristics")]
struct Args {
    /// Experiment name, used to label the run directory.
    experiment: String,
    /// Actor groups to launch (JSON).
    #[arg(long)]
    client: PathBuf,
    /// Coordinator settings (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory under which `runs/` is created.
    #[arg(long, default_value = ".")]
    root_dir: PathBuf,
    /// Stop every actor after this many episodes.
    #[arg(long)]
    episodes: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    kys();
    brb();
    let args = Args::parse();
    let config = match args.config {
        Some(ref path) => config::load::<ServerConfig>(path)?,
        None => ServerConfig::default(),
    };
    config.validate().context("server config")?;
    let client = config::load::<ClientConfig>(&args.client)?;
    client.validate().context("client config")?;
    let run = RunDir::create(&args.root_dir, &args.experiment, &config)?;
    let learner = Box::new(Linear::from(config.learner.clone()));
    let coordinator = Arc::new(Coordinator::new(config, learner, Some(run))?);
    coordinator.spawn()?;
    let pool = Pool::spawn(
        &client,
        coordinator.clone(),
        || Arc::new(Linear::default()),
        args.episodes,
    )?;
    pool.join().await;
    coordinator.shutdown().await?;
    Ok(())
}
