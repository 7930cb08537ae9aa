/*!
 * Command-line interface for xmindctl
 */

use std::fs;
use std::io;
use std::process;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use log::info;

use xmindctl::codec::Workbook;
use xmindctl::config::{Args, Config, Operation};
use xmindctl::editor::Editor;
use xmindctl::error::{Result, ResultExt};
use xmindctl::render::View;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        generate(shell, &mut Args::command(), "xmindctl", &mut io::stdout());
        return;
    }

    let Some(command) = args.command else {
        if let Err(e) = Args::command().print_help() {
            eprintln!("Error: {}", e);
        }
        process::exit(64);
    };

    // Create configuration
    let config = Config::from_args(command, args.verbose, args.zen_fidelity);

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(config: &Config) -> Result<()> {
    // Validate configuration
    config.validate()?;

    match &config.operation {
        Operation::Create {
            sheet_title,
            root,
            format,
        } => {
            let editor = Editor::create(&config.file, sheet_title, root, *format, config.zen_fidelity);
            editor.save()?;
            println!("Created: {}", config.file.display());
            println!("Root topic: {}", root);
        }

        Operation::Show => {
            let workbook = Workbook::open(&config.file, config.zen_fidelity)?;
            print!("{}", View::select(&workbook.document, config.sheet)?.tree());
        }

        Operation::Markdown { output, style } => {
            let workbook = Workbook::open(&config.file, config.zen_fidelity)?;
            let markdown = View::select(&workbook.document, config.sheet)?.markdown(*style);
            match output {
                Some(path) => {
                    fs::write(path, &markdown).with_context(|| path.display())?;
                    info!("Wrote {} bytes of Markdown", markdown.len());
                    println!("Markdown saved to: {}", path.display());
                }
                None => print!("{}", markdown),
            }
        }

        Operation::Add { parent, topic } => {
            let mut editor = Editor::open(&config.file, config.zen_fidelity)?.with_sheet(config.sheet)?;
            editor.add(parent, topic.clone())?;
            editor.save()?;

            println!("Added '{}' under '{}'", topic.title, parent);
            if let Some(note) = &topic.note {
                println!("  Note: {}", note);
            }
            if let Some(comment) = &topic.comment {
                println!("  Comment: {}", comment);
            }
            for marker in &topic.markers {
                println!("  Marker: {}", marker);
            }
            for label in &topic.labels {
                println!("  Label: {}", label);
            }
        }

        Operation::Edit { target, changes } => {
            let mut editor = Editor::open(&config.file, config.zen_fidelity)?.with_sheet(config.sheet)?;
            let before = editor.edit(target, changes.clone())?;
            editor.save()?;

            if let Some(title) = &changes.title {
                println!("Renamed '{}' to '{}'", before.title, title);
            }
            if let Some(note) = &changes.note {
                println!("Updated note: {}", note);
            }
            if let Some(comment) = &changes.comment {
                println!("Updated comment: {}", comment);
            }
            for marker in &changes.markers {
                println!("Added marker: {}", marker);
            }
            for label in &changes.labels {
                println!("Added label: {}", label);
            }
        }

        Operation::Delete { target } => {
            let mut editor = Editor::open(&config.file, config.zen_fidelity)?.with_sheet(config.sheet)?;
            let removed = editor.delete(target)?;
            editor.save()?;

            println!("Deleted '{}'", target);
            let descendants = removed.count() - 1;
            if descendants > 0 {
                println!("  Removed {} subtopic(s)", descendants);
            }
        }
    }

    Ok(())
}
