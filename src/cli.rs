use crate::descriptor::EndpointDescriptor;
use crate::service;
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// OpenAPI from samples - Generate OpenAPI documents from annotated endpoint samples and
/// check existing documents for security compliance
#[derive(Parser, Debug)]
#[command(name = "openapi-from-samples")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an OpenAPI document from a JSON array of endpoint descriptors
    Generate {
        /// Descriptor file, or '-' for stdin
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output format (yaml or json)
        #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
        output_format: OutputFormat,

        /// Output file path (if not specified, outputs to stdout)
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output_path: Option<PathBuf>,
    },
    /// Check an OpenAPI document (YAML or JSON) for compliance issues
    Check {
        /// Document file, or '-' for stdin
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file path for the JSON report (if not specified, outputs to stdout)
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output_path: Option<PathBuf>,

        /// Maximum time allowed for validating the document
        #[arg(long = "timeout-ms", value_name = "MILLIS", default_value_t = 5000)]
        timeout_ms: u64,
    },
    /// Print the liveness status
    Health,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    match &args.command {
        Command::Generate {
            input,
            output_format,
            output_path,
        } => {
            validate_input(input)?;
            info!("Input: {}", input.display());
            info!("Output format: {:?}", output_format);
            log_output(output_path.as_deref());
        }
        Command::Check {
            input,
            output_path,
            timeout_ms,
        } => {
            validate_input(input)?;
            if *timeout_ms == 0 {
                anyhow::bail!("--timeout-ms must be greater than zero");
            }
            info!("Input: {}", input.display());
            info!("Validation timeout: {} ms", timeout_ms);
            log_output(output_path.as_deref());
        }
        Command::Health => {}
    }

    Ok(args)
}

fn validate_input(input: &Path) -> Result<()> {
    if input.as_os_str() == "-" {
        return Ok(());
    }
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    if !input.is_file() {
        anyhow::bail!("Input path is not a file: {}", input.display());
    }
    Ok(())
}

fn log_output(output_path: Option<&Path>) {
    match output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }
}

/// Run the selected command
pub fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Generate {
            input,
            output_format,
            output_path,
        } => run_generate(&input, output_format, output_path.as_deref()),
        Command::Check {
            input,
            output_path,
            timeout_ms,
        } => run_check(&input, Duration::from_millis(timeout_ms), output_path.as_deref()),
        Command::Health => {
            println!("{}", service::health().body);
            Ok(())
        }
    }
}

fn run_generate(
    input: &Path,
    output_format: OutputFormat,
    output_path: Option<&Path>,
) -> Result<()> {
    use crate::openapi_builder::assemble;
    use crate::serializer::{read_input, serialize_json, serialize_yaml};

    info!("Reading endpoint descriptors...");
    let body = read_input(input)?;
    let descriptors: Vec<EndpointDescriptor> = service::decode_descriptors(&body)?;
    info!("Loaded {} endpoint descriptor(s)", descriptors.len());

    info!("Building OpenAPI document...");
    let document = assemble(&descriptors);
    info!("OpenAPI document built with {} path(s)", document.paths.len());

    info!("Serializing to {:?} format...", output_format);
    let content = match output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    emit(&content, output_path)
}

fn run_check(input: &Path, timeout: Duration, output_path: Option<&Path>) -> Result<()> {
    use crate::serializer::read_input;

    info!("Reading OpenAPI document...");
    let text = read_input(input)?;
    if text.is_empty() {
        anyhow::bail!("OpenAPI document is empty");
    }

    info!("Checking compliance...");
    let report = service::compliance_report(&text, timeout);
    if report.is_compliant() {
        info!("No compliance issues found");
    } else {
        for finding in &report.findings {
            log::warn!("{}", finding);
        }
        info!("Found {} compliance issue(s)", report.findings.len());
    }

    let content = serde_json::to_string_pretty(&report)?;
    emit(&content, output_path)
}

fn emit(content: &str, output_path: Option<&Path>) -> Result<()> {
    use crate::serializer::write_to_file;

    if let Some(output_path) = output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(content, output_path)?;
        info!("Successfully wrote {}", output_path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_generate_defaults() {
        let args = parse(&["openapi-from-samples", "generate", "endpoints.json"]);
        match args.command {
            Command::Generate {
                input,
                output_format,
                output_path,
            } => {
                assert_eq!(input, PathBuf::from("endpoints.json"));
                assert_eq!(output_format, OutputFormat::Yaml);
                assert!(output_path.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_check_with_options() {
        let args = parse(&[
            "openapi-from-samples",
            "check",
            "api.yaml",
            "--timeout-ms",
            "250",
            "-o",
            "report.json",
            "-v",
        ]);
        assert!(args.verbose);
        match args.command {
            Command::Check {
                timeout_ms,
                output_path,
                ..
            } => {
                assert_eq!(timeout_ms, 250);
                assert_eq!(output_path, Some(PathBuf::from("report.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let args = parse(&["openapi-from-samples", "generate", "/definitely/not/here.json"]);
        let err = parse_args_from_parsed(args).unwrap_err();
        assert!(err.to_string().starts_with("Input file does not exist"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("api.yaml");
        fs::write(&input, "openapi: 3.0.0").unwrap();

        let args = parse(&[
            "openapi-from-samples",
            "check",
            input.to_str().unwrap(),
            "--timeout-ms",
            "0",
        ]);
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_run_generate_writes_json() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("endpoints.json");
        let output = temp_dir.path().join("out").join("openapi.json");
        fs::write(
            &input,
            r#"[{"endpoint": "/users", "httpMethod": "post", "requestSample": {"name": "string"}}]"#,
        )
        .unwrap();

        run_generate(&input, OutputFormat::Json, Some(&output)).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["info"]["title"], "Dynamic API");
        assert!(written["paths"]["/users"]["post"]["requestBody"].is_object());
    }

    #[test]
    fn test_run_generate_rejects_empty_list() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("endpoints.json");
        fs::write(&input, "[]").unwrap();

        let err = run_generate(&input, OutputFormat::Yaml, None).unwrap_err();
        assert_eq!(err.to_string(), "Request data is missing or null.");
    }

    #[test]
    fn test_run_check_writes_report() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("api.yaml");
        let output = temp_dir.path().join("report.json");
        fs::write(&input, "openapi: 3.0.0\npaths: {}\n").unwrap();

        run_check(&input, Duration::from_secs(5), Some(&output)).unwrap();

        let report: service::ComplianceReport =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(report.findings[0], "Invalid OpenAPI document.");
    }
}
