use colored::Colorize;
use provisio_engine::Engine;

pub fn handle(engine: &Engine, name: &str) -> anyhow::Result<()> {
    let entry = engine.registry().lookup(name)?;

    println!("{}", entry.name.cyan().bold());
    println!("{}", entry.description);
    println!();
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        println!("Tags: {}", tags.join(", "));
    }
    println!("{}", "Required parameters:".bold());
    for param in &entry.required_parameters {
        println!("  • {param}");
    }
    if !entry.optional_parameters.is_empty() {
        println!("{}", "Optional parameters:".bold());
        for param in &entry.optional_parameters {
            println!("  • {param}");
        }
    }
    Ok(())
}
