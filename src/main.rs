use anyhow::Result;

fn main() -> Result<()> {
    comfy_modal::cli::run()
}
