//! dexpreopt-config - resolve dexpreopt boot image and classpath configuration
//!
//! Main entry point for the command line tool.
//!
//! # Execution Flow
//!
//! 1. Initialize logging (stderr, plus a rotating file when `--log-dir` is given)
//! 2. Load build settings: defaults, then `--settings` YAML, then `DEXPREOPT_*` env vars
//! 3. Apply command line overrides (`--global-config`, `--device`, `--out-dir`)
//! 4. Create the [`BuildContext`] and run the requested command against it
//! 5. Log resolution metrics
//!
//! # Commands
//!
//! - `make-vars`: print the exported make variables as `NAME := value`
//! - `boot-image --variant <default|apex|art>`: print one boot image config as YAML
//! - `system-server-classpath`: print the system server classpath, one jar per line
//! - `bootclasspath`: print the device boot classpath, one jar per line

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use dexpreopt_config::services::{
    boot_image_config, collect_make_vars, default_bootclasspath, system_server_classpath,
};
use dexpreopt_config::{APP_NAME, BootImageVariant, BuildContext, BuildSettings, VERSION};

#[derive(Debug, Parser)]
#[command(name = "dexpreopt-config", version, about)]
struct Cli {
    /// YAML build settings file
    #[arg(long, value_name = "FILE")]
    settings: Option<Utf8PathBuf>,

    /// Global dexpreopt config file (overrides the settings file)
    #[arg(long, value_name = "FILE")]
    global_config: Option<Utf8PathBuf>,

    /// Device name (overrides the settings file)
    #[arg(long, value_name = "NAME")]
    device: Option<String>,

    /// Build output directory (overrides the settings file)
    #[arg(long, value_name = "DIR")]
    out_dir: Option<Utf8PathBuf>,

    /// Also write logs to a daily rotating file in this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<Utf8PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the dexpreopt make variables
    MakeVars,
    /// Print a boot image config as YAML
    BootImage {
        #[arg(long, default_value = "default")]
        variant: BootImageVariant,
    },
    /// Print the system server classpath
    SystemServerClasspath,
    /// Print the device boot classpath
    Bootclasspath,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = dexpreopt_config::logging::setup_logging(cli.log_dir.as_deref(), APP_NAME, cli.verbose)?;
    tracing::debug!("Starting {} v{}", APP_NAME, VERSION);

    let mut settings =
        BuildSettings::load(cli.settings.as_deref()).context("Failed to load build settings")?;
    if let Some(path) = cli.global_config {
        settings.global_config = Some(path);
    }
    if let Some(device) = cli.device {
        settings.device_name = device;
    }
    if let Some(out_dir) = cli.out_dir {
        settings.out_dir = out_dir;
    }

    let ctx = BuildContext::new(settings);

    match cli.command {
        Command::MakeVars => {
            let vars = collect_make_vars(&ctx).context("Failed to resolve make variables")?;
            for (name, value) in &vars {
                println!("{name} := {value}");
            }
        }
        Command::BootImage { variant } => {
            let image = boot_image_config(&ctx, variant)
                .with_context(|| format!("Failed to resolve {variant} boot image config"))?;
            let yaml = serde_yaml_ng::to_string(image.as_ref())
                .context("Failed to serialize boot image config to YAML")?;
            print!("{yaml}");
        }
        Command::SystemServerClasspath => {
            let classpath =
                system_server_classpath(&ctx).context("Failed to resolve system server classpath")?;
            for jar in classpath.iter() {
                println!("{jar}");
            }
        }
        Command::Bootclasspath => {
            let classpath =
                default_bootclasspath(&ctx).context("Failed to resolve boot classpath")?;
            for jar in classpath.iter() {
                println!("{jar}");
            }
        }
    }

    ctx.metrics().log_summary();
    Ok(())
}
