//! roadmctl: offline tooling for the ROADM driver.
//!
//! Validates testbed configuration files and renders channel plans, either
//! as JSON or as the exact bulk-add document the device would receive. No
//! device session is opened.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wdm_common::TestbedConfig;
use wdm_roadm::{
    commands, ChannelSpan, ConnectionSpec, FlexGridPlan, GridOptions, PlanGenerator,
    DEFAULT_PORT_OFFSET, DEFAULT_WSS_LOSS,
};

#[derive(Parser, Debug)]
#[command(name = "roadmctl", version, about = "ROADM channel plan tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate a testbed configuration file
    ValidateConfig {
        /// Path to the YAML file
        path: PathBuf,
    },
    /// Render a channel plan
    #[command(subcommand)]
    Plan(PlanCommand),
}

#[derive(Subcommand, Debug)]
enum PlanCommand {
    /// All 95 channels between one pair of ports
    Uniform {
        #[command(flatten)]
        common: PlanArgs,
        #[arg(long)]
        input_port: u16,
        #[arg(long)]
        output_port: u16,
    },
    /// Per-channel or per-group port assignments
    Flex {
        #[command(flatten)]
        common: PlanArgs,
        /// `<channel>=<offset>` or `<first>-<last>=<offset>`, repeatable
        #[arg(long = "assign", value_parser = parse_assignment)]
        assignments: Vec<(ChannelSpan, u16)>,
        #[arg(long, default_value_t = DEFAULT_PORT_OFFSET)]
        default_port: u16,
    },
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// WSS module: 1 (MUX) or 2 (DEMUX)
    #[arg(long)]
    module: u8,
    /// Channels to leave unblocked
    #[arg(long, value_delimiter = ',')]
    open: Vec<u32>,
    /// Base WSS loss in dB
    #[arg(long, default_value_t = DEFAULT_WSS_LOSS)]
    loss: f64,
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Xml,
}

fn parse_assignment(s: &str) -> Result<(ChannelSpan, u16), String> {
    let (span, offset) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not <channels>=<offset>", s))?;
    let span = span.trim().parse::<ChannelSpan>().map_err(|e| e.to_string())?;
    let offset = offset
        .trim()
        .parse::<u16>()
        .map_err(|e| format!("invalid port offset '{}': {}", offset, e))?;
    Ok((span, offset))
}

/// Initialize tracing/logging. `RUST_LOG` overrides the default level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn validate_config(path: &PathBuf) -> Result<()> {
    let config = TestbedConfig::load(path)?;
    for (name, endpoint) in &config.devices {
        println!("{}\t{}:{}", name, endpoint.host, endpoint.port);
    }
    Ok(())
}

fn render_plan(command: PlanCommand) -> Result<()> {
    let (common, connections) = match command {
        PlanCommand::Uniform {
            common,
            input_port,
            output_port,
        } => {
            let plan = PlanGenerator::for_module(common.module)?
                .uniform_grid(input_port, output_port, &options(&common))?;
            (common, plan)
        }
        PlanCommand::Flex {
            common,
            assignments,
            default_port,
        } => {
            let flex = FlexGridPlan::new(assignments).with_default_port(default_port);
            let plan = PlanGenerator::for_module(common.module)?.flex_grid(&flex, &options(&common))?;
            (common, plan)
        }
    };

    info!(
        module = common.module,
        "Generated {} connections",
        connections.len()
    );
    println!("{}", render(&connections, common.format)?);
    Ok(())
}

fn options(common: &PlanArgs) -> GridOptions {
    GridOptions::default()
        .with_base_loss(common.loss)
        .with_open_channels(common.open.iter().copied())
}

fn render(connections: &[ConnectionSpec], format: Format) -> Result<String> {
    match format {
        Format::Json => {
            serde_json::to_string_pretty(connections).context("failed to serialize plan")
        }
        Format::Xml if connections.is_empty() => Err(anyhow!("plan has no connections")),
        Format::Xml => Ok(commands::bulk_add_config(connections)),
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::ValidateConfig { path } => validate_config(&path),
        Command::Plan(plan) => render_plan(plan),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("roadmctl error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assignment() {
        let (span, offset) = parse_assignment("3-5=2").unwrap();
        assert_eq!(span, ChannelSpan::Group(vec![3, 4, 5]));
        assert_eq!(offset, 2);
        assert_eq!(parse_assignment("9=4").unwrap().0, ChannelSpan::Single(9));
        assert!(parse_assignment("9").is_err());
        assert!(parse_assignment("9=x").is_err());
        assert!(parse_assignment("1-4000000000=2").is_err());
        assert!(parse_assignment("90-96=2").is_err());
    }

    #[test]
    fn test_parse_flex_command() {
        let cli = Cli::try_parse_from([
            "roadmctl", "plan", "flex", "--module", "2", "--assign", "3-5=2", "--open", "1,4",
        ])
        .unwrap();
        match cli.command {
            Command::Plan(PlanCommand::Flex {
                common,
                assignments,
                default_port,
            }) => {
                assert_eq!(common.module, 2);
                assert_eq!(common.open, vec![1, 4]);
                assert_eq!(assignments.len(), 1);
                assert_eq!(default_port, DEFAULT_PORT_OFFSET);
                assert_eq!(common.format, Format::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_validate_config() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "devices:\n  roadm_1: {{ host: 10.10.10.38 }}").unwrap();
        assert!(validate_config(&file.path().to_path_buf()).is_ok());

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "telemetry_retries: 0").unwrap();
        assert!(validate_config(&bad.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_render_xml() {
        let plan = PlanGenerator::for_module(1)
            .unwrap()
            .uniform_grid(4101, 4201, &GridOptions::default())
            .unwrap();
        let doc = render(&plan, Format::Xml).unwrap();
        assert!(doc.starts_with("<xc:config"));
        assert!(render(&[], Format::Xml).is_err());
    }
}
