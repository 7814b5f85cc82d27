mod commands;
mod config;
mod progress;
mod registry;

use std::collections::HashMap;

use clap::Parser;
use ora2pg_connectors::{Connector, InMemoryConnector};
use ora2pg_jobs::CancelToken;
use ora2pg_pipeline::{MigrationPipeline, RenderConfig, StageOutcome};
use serde_json::json;

use commands::{Cli, Commands};
use config::MigrationConfig;
use progress::JsonLinesProgressSink;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_env("ORA2PG_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let pipeline = build_pipeline(&config, cli.dry_run);

    let exit_code = match cli.command {
        Commands::Migrate => run_migrate(&pipeline),
        Commands::Job { database, operation_type } => run_job(&pipeline, &database, &operation_type),
    };
    std::process::exit(exit_code);
}

fn load_config(path: Option<&std::path::Path>) -> MigrationConfig {
    let config = match path {
        Some(path) => MigrationConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("failed to load config from {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => MigrationConfig::default(),
    };
    config.apply_env_overrides()
}

/// Neither a real Oracle driver nor a real PostgreSQL driver is wired up
/// here: connection parameters only gate whether a side is "configured",
/// same as `ora2pg-connectors`' in-memory test double the pipeline crate
/// tests against. An embedding process with real drivers implements
/// `Connector` itself and calls `ora2pg-pipeline` directly.
fn build_pipeline(config: &MigrationConfig, dry_run: bool) -> MigrationPipeline {
    let source: Box<dyn Connector> = if config.source.is_empty() {
        Box::new(InMemoryConnector::unconfigured())
    } else {
        Box::new(InMemoryConnector::new(HashMap::new()))
    };
    let target: Box<dyn Connector> = if config.target.is_empty() {
        Box::new(InMemoryConnector::unconfigured())
    } else {
        Box::new(InMemoryConnector::new(HashMap::new()))
    };

    let current_schema = config.r#do.only_test_schema.clone().unwrap_or_default();
    let render = RenderConfig { current_schema, synonyms: HashMap::new() };

    MigrationPipeline::new(
        source,
        target,
        Box::new(JsonLinesProgressSink::new(std::io::stdout())),
        CancelToken::new(),
        render,
        config.system_schemas.exclude_list.clone(),
        dry_run,
    )
}

fn run_migrate(pipeline: &MigrationPipeline) -> i32 {
    match pipeline.run() {
        Ok(reports) => {
            let mut failed = false;
            let stages: Vec<_> = reports
                .iter()
                .map(|r| match &r.outcome {
                    StageOutcome::Completed(detail) => json!({"stage": r.stage.name(), "status": "success", "message": detail}),
                    StageOutcome::Failed(e) => {
                        failed = true;
                        json!({"stage": r.stage.name(), "status": "error", "message": e.to_string()})
                    }
                })
                .collect();
            println!("{}", json!({"stages": stages}));
            i32::from(failed)
        }
        Err(e) => {
            println!("{}", json!({"status": "error", "message": e.to_string()}));
            1
        }
    }
}

fn run_job(pipeline: &MigrationPipeline, database: &str, operation_type: &str) -> i32 {
    let Some(db) = registry::Database::parse(database) else {
        println!("{}", json!({"status": "error", "message": format!("unknown database: {database}")}));
        return 1;
    };
    let Some(stage) = registry::create_job(db, operation_type) else {
        println!("{}", json!({"status": "error", "message": format!("unknown operation type {operation_type} for {database}")}));
        return 1;
    };

    let report = pipeline.run_one(stage);
    match report.outcome {
        StageOutcome::Completed(detail) => {
            let job_id = format!("{database}-{}", stage.name());
            println!("{}", json!({"status": "success", "jobId": job_id, "message": detail}));
            0
        }
        StageOutcome::Failed(e) => {
            println!("{}", json!({"status": "error", "message": e.to_string()}));
            1
        }
    }
}
