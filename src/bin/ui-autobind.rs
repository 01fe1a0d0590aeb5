use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use ui_autobind::analysis::{builtin_ui_types, scene_types, LayeredTypeSource, TypeRegistry};
use ui_autobind::binder::{CompilationHost, SourceScanner, WaitPolicy};
use ui_autobind::interface::{
    bind_containers, generate_containers, print_binding_result, print_generated_files,
    print_validations, resolve_containers, select_containers, validate_containers, BindConfig,
    BindOptions, Cli, Commands, Logger, SceneArgs,
};
use ui_autobind::scene::SceneTree;
use ui_autobind::sync::ContainerLocks;

type CliResult = Result<bool, Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn load_config(cli: &Cli, logger: &Logger) -> Result<BindConfig, Box<dyn std::error::Error>> {
    let mut config = BindConfig::load_or_default(&cli.config_file, logger)?;
    config.merge(&BindConfig::from(cli));
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Returns whether the command succeeded
fn run(cli: &Cli) -> CliResult {
    let bootstrap = if cli.json {
        Logger::quiet()
    } else {
        Logger::new(cli.verbose, false)
    };

    if let Commands::Init { force } = &cli.command {
        return run_init(&cli.config_file, *force, &bootstrap);
    }

    let config = load_config(cli, &bootstrap)?;
    let logger = if cli.json {
        Logger::quiet()
    } else {
        Logger::new(config.is_verbose(), false)
    };

    match &cli.command {
        Commands::Init { .. } => Ok(true),
        Commands::Resolve { scene, dry_run } => {
            run_resolve(cli, &config, scene, *dry_run, &logger)
        }
        Commands::Generate { scene, .. } => run_generate(cli, &config, scene, &logger),
        Commands::Bind {
            scene,
            wait_ms,
            poll_ms,
            ..
        } => run_bind(cli, &config, scene, *wait_ms, *poll_ms, &logger),
        Commands::Validate { scene, .. } => run_validate(cli, &config, scene, &logger),
        Commands::Types { query, scene } => run_types(cli, query.as_deref(), scene.as_deref()),
    }
}

fn run_init(path: &Path, force: bool, logger: &Logger) -> CliResult {
    if path.exists() && !force {
        logger.warning(&format!(
            "{} already exists, use --force to overwrite it",
            path.display()
        ));
        return Ok(false);
    }
    BindConfig::regenerate(path)?;
    logger.info(&format!("✓ Wrote default configuration to {}", path.display()));
    Ok(true)
}

fn run_resolve(
    cli: &Cli,
    config: &BindConfig,
    args: &SceneArgs,
    dry_run: bool,
    logger: &Logger,
) -> CliResult {
    let mut tree = SceneTree::load(&args.scene)?;
    let containers = select_containers(&tree, &args.containers)?;
    let types = TypeRegistry::new(
        LayeredTypeSource::new()
            .with_layer(builtin_ui_types())
            .with_layer(scene_types(&tree)),
    );

    let summaries = resolve_containers(&mut tree, &containers, &config.naming, &types, logger)?;
    if !dry_run {
        tree.save(&args.scene)?;
    }

    if cli.json {
        print_json(&summaries)?;
    } else {
        for summary in &summaries {
            logger.info(&format!(
                "{}: {} added, {} already bound, {} unmatched",
                summary.container,
                summary.added.len(),
                summary.skipped,
                summary.unmatched.len()
            ));
            for field in &summary.added {
                logger.verbose(&format!("  + {}", field));
            }
        }
    }
    Ok(true)
}

fn run_generate(cli: &Cli, config: &BindConfig, args: &SceneArgs, logger: &Logger) -> CliResult {
    let tree = SceneTree::load(&args.scene)?;
    let containers = select_containers(&tree, &args.containers)?;
    let locks = ContainerLocks::new();

    let report = generate_containers(
        &tree,
        &containers,
        &config.generation,
        &locks,
        None,
        logger,
    )?;

    if cli.json {
        print_json(&report)?;
    } else {
        print_generated_files(&report.files);
        for error in &report.result.errors {
            logger.error(error);
        }
    }
    Ok(report.is_success())
}

fn run_bind(
    cli: &Cli,
    config: &BindConfig,
    args: &SceneArgs,
    wait_ms: u64,
    poll_ms: u64,
    logger: &Logger,
) -> CliResult {
    let mut tree = SceneTree::load(&args.scene)?;
    let containers = select_containers(&tree, &args.containers)?;
    let mut host = SourceScanner::new(&config.generation.base_path, &config.generation.file_extension)?;

    let policy = WaitPolicy::Poll {
        interval: Duration::from_millis(poll_ms.max(1)),
        timeout: Duration::from_millis(wait_ms),
    };
    let locks = ContainerLocks::new();
    let options = BindOptions {
        wait: Some(&policy),
        locks: &locks,
        cancel: None,
        logger,
    };

    let result = bind_containers(
        &mut tree,
        &containers,
        &mut host,
        &config.generation,
        &options,
    )?;
    tree.save(&args.scene)?;

    if cli.json {
        print_json(&result)?;
    } else {
        print_binding_result(&result);
    }
    Ok(result.is_success())
}

fn run_validate(cli: &Cli, config: &BindConfig, args: &SceneArgs, logger: &Logger) -> CliResult {
    let tree = SceneTree::load(&args.scene)?;
    let containers = select_containers(&tree, &args.containers)?;
    let mut host = SourceScanner::new(&config.generation.base_path, &config.generation.file_extension)?;
    host.refresh()?;

    let report = validate_containers(&tree, &containers, &host, &config.generation);
    if report.validations.is_empty() {
        logger.warning("No container has bindings to validate");
    }

    if cli.json {
        print_json(&report)?;
    } else {
        print_validations(&report);
    }
    Ok(report.is_valid())
}

fn run_types(cli: &Cli, query: Option<&str>, scene: Option<&Path>) -> CliResult {
    let mut source = LayeredTypeSource::new().with_layer(builtin_ui_types());
    if let Some(scene) = scene {
        let tree = SceneTree::load(scene)?;
        source = source.with_layer(scene_types(&tree));
    }
    let registry = TypeRegistry::new(source);
    let found = registry.search(query.unwrap_or(""));

    if cli.json {
        let names: Vec<String> = found.iter().map(|t| t.type_ref.qualified()).collect();
        print_json(&names)?;
    } else {
        for info in &found {
            println!("{}", info.type_ref);
        }
    }
    Ok(true)
}
