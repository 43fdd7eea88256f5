use anyhow::Context;
use clap::Parser;
use ml_env_provision::config::LogFormat;
use ml_env_provision::core::handoff;
use ml_env_provision::utils::{logger, validation::Validate};
use ml_env_provision::{
    CliConfig, Handoff, ProcessRunner, ProvisionConfig, ProvisionError, Provisioner,
};

fn load_config(cli: &CliConfig) -> anyhow::Result<ProvisionConfig> {
    let config = match &cli.config {
        Some(path) => ProvisionConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => ProvisionConfig::default(),
    };
    config.validate().context("configuration validation failed")?;
    Ok(config)
}

fn print_dry_run<R: ml_env_provision::core::CommandRunner>(provisioner: &Provisioner<R>) {
    let (plan, handoff) = provisioner.plan();
    for planned in plan {
        if planned.skipped {
            println!("[{}] skipped", planned.checkpoint);
            continue;
        }
        println!("[{}]", planned.checkpoint);
        for command in planned.commands {
            println!("  {}", command);
        }
    }
    match handoff {
        Handoff::Exec(command) => match &command.current_dir {
            Some(dir) => println!("[handoff] cd {} && exec {}", dir.display(), command),
            None => println!("[handoff] exec {}", command),
        },
        Handoff::Instruct(_) => println!("[handoff] print activation instructions"),
    }
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let layout = match config.layout(cli.project_root.as_deref()) {
        Ok(layout) => layout,
        Err(e) => {
            let e = ProvisionError::ConfigError {
                message: format!("cannot resolve project root: {}", e),
            };
            tracing::error!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };
    tracing::debug!("Layout: {:?}", layout);

    let provisioner = Provisioner::from_config(
        &config,
        layout,
        cli.run_mode(),
        ProcessRunner::new(),
        cli.monitor,
    );

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be executed");
        print_dry_run(&provisioner);
        return;
    }

    let outcome = match provisioner.run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };

    match outcome.handoff {
        Handoff::Instruct(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Handoff::Exec(command) => {
            let e = handoff::exec(&command);
            tracing::error!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
