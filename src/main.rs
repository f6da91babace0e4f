// src/main.rs

use xcpilot::response::ToolResponse;
use xcpilot::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::parse();
    let json = args.json;

    match run_main(args).await {
        Ok(response) => {
            if let Err(err) = print_response(&response, json) {
                eprintln!("xcpilot error: {err:?}");
                std::process::exit(1);
            }
            if !response.success {
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("xcpilot error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main(args: cli::CliArgs) -> anyhow::Result<ToolResponse> {
    logging::init_logging(args.log_level)?;
    run(args).await
}

fn print_response(response: &ToolResponse, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }
    if !response.output.is_empty() {
        println!("{}", response.output.trim_end());
    }
    if let Some(error) = &response.error {
        eprintln!("{error}");
    }
    Ok(())
}
