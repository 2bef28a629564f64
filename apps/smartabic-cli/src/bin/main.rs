use std::env;
use std::io;
use std::path::PathBuf;

use smartabic_cli::{build_pipeline, chat, init_tracing};
use smartabic_core::config::Config;
use smartabic_core::types::AskRequest;

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {} [--config <path>] <ask|retrieve|chat> [question...]", prog);
    std::process::exit(1);
}

fn parse_args() -> (Option<PathBuf>, String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    let mut config_path = None;
    if args.first().map(String::as_str) == Some("--config") {
        args.remove(0);
        if args.is_empty() { usage(&prog); }
        config_path = Some(PathBuf::from(args.remove(0)));
    }
    if args.is_empty() { usage(&prog); }
    let cmd = args.remove(0);
    (config_path, cmd, args)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let (config_path, cmd, args) = parse_args();
    let config = match &config_path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .map_err(|e| { eprintln!("Error loading config: {}", e); e })?;

    match cmd.as_str() {
        "ask" => {
            let request = AskRequest { question: args.join(" ") };
            let pipeline = build_pipeline(&config)?;
            let response = pipeline.handle(&request)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        "retrieve" => {
            let question = args.join(" ");
            let pipeline = build_pipeline(&config)?;
            let ranked = pipeline.retrieve(&question)?;
            println!("Found {} results for: \"{}\"", ranked.len(), question.trim());
            for (i, r) in ranked.iter().enumerate() {
                println!("\n  {}. similarity={:.4}  keywords={}  chunk={}", i + 1, r.similarity(), r.keyword_score, r.candidate.chunk_id);
                println!("     {}", r.text);
            }
        }
        "chat" => chat(&build_pipeline(&config)?, io::stdin().lock(), io::stdout())?,
        _ => { eprintln!("Unknown command: {}", cmd); std::process::exit(1); }
    }
    Ok(())
}
