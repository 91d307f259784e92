use console::style;

/// Entry point for the `pear` binary.
///
/// Delegates to the CLI entry function and exits the process with the
/// returned exit code. If an error occurs, prints it to stderr and exits
/// with status code 1.
fn main() {
    match git_pear::cli::entry() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", style(format!("Error: {}", e)).red().bold());
            std::process::exit(1)
        }
    }
}
