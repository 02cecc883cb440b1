use clap::CommandFactory;
use clap_complete::Shell;

pub fn run(shell: Shell) -> Result<(), Box<dyn std::error::Error>> {
    let mut command = crate::Cli::command();
    clap_complete::generate(shell, &mut command, "calsync", &mut std::io::stdout());
    Ok(())
}
