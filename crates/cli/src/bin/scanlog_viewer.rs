use anyhow::Result;

fn main() -> Result<()> {
    scanlog_cli::main_entry()
}
