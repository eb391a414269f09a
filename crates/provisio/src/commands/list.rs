use colored::Colorize;
use provisio_engine::Engine;

pub fn handle(engine: &Engine, tag: Option<&str>) -> anyhow::Result<()> {
    let entries = engine.registry().list(tag);

    if entries.is_empty() {
        match tag {
            Some(tag) => println!("No capabilities with tag '{tag}'"),
            None => println!("No capabilities registered"),
        }
        return Ok(());
    }

    println!("{}", format!("Capabilities ({}):", entries.len()).bold());
    for entry in entries {
        println!("  • {} — {}", entry.name.cyan(), entry.description);
    }
    Ok(())
}
