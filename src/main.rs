use skyroster::core::output;

fn main() -> anyhow::Result<()> {
    if let Err(err) = skyroster::run() {
        output::print_error(&err);
        std::process::exit(1);
    }
    Ok(())
}
