use sculpt_lib::command::execute_json_batch;
use sculpt_lib::controller;
use sculpt_lib::harness::TestHarness;
use sculpt_lib::state::{EditorSettings, ProjectLibrary};

struct Args {
    script: Option<String>,
    scene: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sculpt=info,sculpt_lib=info".into()),
        )
        .init();

    let args = parse_args();
    let Some(script_path) = args.script else {
        eprintln!("usage: sculpt --script <commands.json> [--scene <project.json>]");
        std::process::exit(2);
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    let mut harness = TestHarness::with_settings(EditorSettings::load());
    harness.app.projects = ProjectLibrary::open();

    if let Some(path) = &args.scene {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                if let Err(e) = controller::import_project_json(&mut harness.app, &json) {
                    tracing::error!("Failed to load scene from {path}: {e}");
                    std::process::exit(1);
                }
                tracing::info!("Loaded scene from {path} ({} shapes)", harness.shape_count());
            }
            Err(e) => {
                tracing::error!("Failed to read scene file {path}: {e}");
                std::process::exit(1);
            }
        }
    }

    let script = match std::fs::read_to_string(&script_path) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to read script {script_path}: {e}");
            std::process::exit(1);
        }
    };

    let responses = match runtime.block_on(execute_json_batch(&mut harness, &script)) {
        Ok(responses) => responses,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let failed = responses.iter().filter(|r| !r.success).count();
    match serde_json::to_string_pretty(&responses) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to encode responses: {e}"),
    }

    harness.app.projects.persist();
    if failed > 0 {
        tracing::error!("{failed} of {} commands failed", responses.len());
        std::process::exit(1);
    }
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        script: None,
        scene: None,
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--script" if i + 1 < args.len() => {
                parsed.script = Some(args[i + 1].clone());
                i += 1;
            }
            "--scene" if i + 1 < args.len() => {
                parsed.scene = Some(args[i + 1].clone());
                i += 1;
            }
            other => tracing::warn!("Ignoring argument {other}"),
        }
        i += 1;
    }
    parsed
}
