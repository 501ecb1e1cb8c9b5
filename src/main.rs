use clap::Parser;
use lbrule::cli::setup::{build_reconciler, load_config_with_overrides};
use lbrule::cli::{
    apply, delete, handle_completions, handle_config_init, list, plan, Cli, Commands,
    ConfigCommands, GlobalArgs,
};
use lbrule::logging::init_tracing;
use lbrule::reconcile::RuleReconciler;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Option<String>> {
    let output = match &cli.command {
        Commands::Config(ConfigCommands::Init(args)) => handle_config_init(args)?,
        Commands::Completions(args) => {
            handle_completions(args);
            return Ok(None);
        }
        Commands::Apply(args) => {
            let (reconciler, cancel) = connect(&cli.global)?;
            apply::handle_apply(args, &reconciler, &cancel).await?
        }
        Commands::Plan(args) => {
            let (reconciler, _) = connect(&cli.global)?;
            plan::handle_plan(args, &reconciler).await?
        }
        Commands::List(args) => {
            let (reconciler, _) = connect(&cli.global)?;
            list::handle_list(args, &reconciler).await?
        }
        Commands::Delete(args) => {
            let (reconciler, _) = connect(&cli.global)?;
            delete::handle_delete(args, &reconciler).await?
        }
    };
    Ok(Some(output))
}

/// Load configuration, start logging and build the reconciler. Ctrl-C
/// cancels the returned token.
fn connect(global: &GlobalArgs) -> anyhow::Result<(RuleReconciler, CancellationToken)> {
    let config = load_config_with_overrides(global)?;
    init_tracing(&config.logging)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;
    let reconciler = build_reconciler(&config)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    Ok((reconciler, cancel))
}
