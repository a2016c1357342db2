//! Shared helpers for CLI commands.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;

use qbridge_qasm::syntax;
use qbridge_transpiler::{IonQProgram, Program, Qasm2, Qasm3, Transpiler, TranspilerConfig};

/// Read program text from a file, or from stdin when `path` is `-`.
pub fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        return Ok(source);
    }

    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
}

/// Write `content` to `output`, or to stdout when no file is given.
pub fn write_output(content: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write file: {path}"))?;
            eprintln!("  Output: {}", style(path).green());
        }
        None => {
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

/// `~/.config/qbridge/config.yaml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("qbridge").join("config.yaml"))
}

/// Load the transpiler configuration: the explicit file if given, else the
/// default config file if it exists, with `QBRIDGE_*` variables on top.
pub fn load_config(config: Option<&Path>) -> Result<TranspilerConfig> {
    let fallback = default_config_path().filter(|p| p.exists());
    let path = config.or(fallback.as_deref());
    if let Some(path) = path {
        tracing::debug!("Loading configuration from {}", path.display());
    }
    TranspilerConfig::load(path).context("Failed to load configuration")
}

/// Build a transpiler from the loaded configuration.
pub fn load_transpiler(config: Option<&Path>) -> Result<Transpiler> {
    let config = load_config(config)?;
    Transpiler::from_config(&config).context("Invalid transpiler configuration")
}

/// Render a converted program as text.
pub fn render_program(program: &Program) -> Result<String> {
    if let Some(Qasm2(text)) = program.downcast_ref::<Qasm2>() {
        return Ok(text.clone());
    }
    if let Some(Qasm3(text)) = program.downcast_ref::<Qasm3>() {
        return Ok(text.clone());
    }
    if let Some(ast) = program.downcast_ref::<syntax::Program>() {
        return Ok(qbridge_qasm::emit(ast));
    }
    if let Some(ionq) = program.downcast_ref::<IonQProgram>() {
        return ionq.to_json().context("Failed to serialize IonQ circuit");
    }
    anyhow::bail!("No text form for program payload {}", program.type_name())
}
