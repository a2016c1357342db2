//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - quantum program conversion toolkit",
        style("qbridge").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qbridge-qasm        OpenQASM 2/3 parser and emitter");
    println!("  qbridge-compile     Rebase engine and text compatibility passes");
    println!("  qbridge-transpiler  Conversion graph and transpile driver");
    println!("  qbridge-cli         Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
