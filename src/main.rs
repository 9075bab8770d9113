use anyhow::{Context, Result};
use clap::Parser;

use complete_mentions::cli::{CliArgs, OutputFormat};
use complete_mentions::mentions::Segment;
use complete_mentions::script::{Script, StepOutput};
use complete_mentions::tracker::TrackerEvent;

fn main() -> Result<()> {
    complete_mentions::tracing::init();

    let run = CliArgs::parse()
        .into_config()
        .map_err(anyhow::Error::msg)?;

    let script = Script::load(&run.script)
        .with_context(|| format!("Failed to load script {}", run.script.display()))?;

    let mut config = run.input_config().context("Failed to load config")?;
    if let Some(platform) = run.platform.or(script.platform) {
        config.platform = platform;
    }
    tracing::info!(
        "Replaying {} step(s) on {}",
        script.steps.len(),
        config.platform.as_str()
    );

    let initial_text = run.initial_text.as_deref().unwrap_or(&script.text);
    let mut input = config
        .build_input(initial_text)
        .context("Invalid trigger configuration")?;

    for output in script.run(&mut input) {
        match run.output {
            OutputFormat::JsonLines => println!("{}", serde_json::to_string(&output)?),
            OutputFormat::Human => print_step(&output),
        }
    }

    Ok(())
}

fn print_step(output: &StepOutput<String>) {
    println!("[{}] {}", output.index, output.step);
    println!("    text:      {:?} {}", output.text, output.selection);
    for (tag, event) in &output.tracker_events {
        match event {
            TrackerEvent::StartTracking => println!("    {} start tracking", tag),
            TrackerEvent::StopTracking => println!("    {} stop tracking", tag),
            TrackerEvent::KeywordChange(keyword) => println!("    {} keyword {:?}", tag, keyword),
            TrackerEvent::Commit(commitment) => {
                println!("    {} commit {:?}", tag, commitment.display_name)
            }
        }
    }
    if let Some(commitment) = &output.commitment {
        println!(
            "    committed: {:?} at {}..{}",
            commitment.display_name, commitment.start, commitment.end
        );
    }
    let rendered: String = output
        .segments
        .iter()
        .map(|segment| match segment {
            Segment::Plain(text) => text.clone(),
            Segment::Mention { node, .. } => node.clone(),
        })
        .collect();
    println!("    rendered:  {:?}", rendered);
    println!("    extracted: {:?}", output.extracted);
}
