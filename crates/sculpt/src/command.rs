//! JSON command protocol for scripted and agent-driven sessions.
//!
//! Commands mirror the controller API one to one. Execution is async only
//! because `repeat_many` pauses between iterations.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{ProjectFile, Transform};

use crate::controller::{self, Key, PointerRay};
use crate::export;
use crate::harness::TestHarness;
use crate::ops::PrimitiveKind;
use crate::persistence;
use crate::replay::RepeatPrompt;
use crate::state::ToolMode;
use crate::viewport::camera::ArcBallCamera;

/// A command the editor can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Add a palette primitive, at a random spot when no position is given
    AddPrimitive {
        kind: PrimitiveKind,
        #[serde(default)]
        position: Option<[f32; 3]>,
    },
    /// Toggle a tool mode (re-toggling returns to select)
    ToggleTool { mode: ToolMode },
    /// Escape
    Cancel,
    ToggleStraightLines,
    KeyDown { key: Key },
    PointerDown { origin: [f32; 3], direction: [f32; 3] },
    PointerMove { origin: [f32; 3], direction: [f32; 3] },
    PointerUp,
    /// Press and release looking straight down onto `point`
    ClickAt { point: [f32; 3] },
    /// Drag through world points at draw depth
    Stroke { points: Vec<[f32; 3]> },
    /// Turn the drawn stroke into a tube
    Shapeify,
    Merge,
    DeleteSelected,
    Clear,
    SetTransform { id: String, transform: Transform },
    /// Place the camera
    LookFrom { eye: [f32; 3], target: [f32; 3] },
    ShowRepeatPrompt { prompt: RepeatPrompt },
    Repeat {
        #[serde(default)]
        distance: Option<f32>,
    },
    RepeatMany {
        count: u32,
        #[serde(default)]
        distance: Option<f32>,
    },
    SaveProject {
        #[serde(default)]
        name: Option<String>,
    },
    LoadProject { name: String },
    DeleteProject { name: String },
    NewProject,
    ListProjects,
    ImportProject { project: ProjectFile },
    ExportProject,
    /// Binary STL of the whole scene, written to `path` when given
    ExportStl {
        #[serde(default)]
        path: Option<String>,
    },
    /// List shapes and editor state
    Inspect,
    /// Drain the notification log
    Notifications,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Unit result of a controller call: fatal errors fail the command
fn done<E: std::fmt::Display>(result: Result<(), E>) -> CommandResponse {
    match result {
        Ok(()) => CommandResponse::ok(),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

fn id_response<E: std::fmt::Display>(result: Result<Option<String>, E>) -> CommandResponse {
    match result {
        Ok(id) => CommandResponse::ok_with_data(serde_json::json!({ "id": id })),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

fn inspect(harness: &TestHarness) -> serde_json::Value {
    let app = &harness.app;
    let shapes: Vec<serde_json::Value> = app
        .registry
        .all()
        .iter()
        .map(|shape| {
            let record = persistence::shape_record(shape);
            serde_json::json!({
                "id": shape.id,
                "name": shape.name,
                "kind": record.kind,
                "position": record.position,
                "rotation": record.rotation,
                "scale": record.scale,
                "color": format!("#{:06x}", shape.color),
                "triangles": shape.local_mesh().triangle_count(),
            })
        })
        .collect();

    serde_json::json!({
        "shape_count": shapes.len(),
        "shapes": shapes,
        "tool": app.tool.active(),
        "straight_lines": app.tool.straight_lines(),
        "selected": app.selection.selected(),
        "gizmo": app.selection.gizmo(),
        "repeat_prompt": app.replay.prompt(),
        "repeat_title": app.replay.prompt_title(),
        "last_operation": app.replay.last(),
        "project": app.projects.current_name(),
        "version": app.registry.version(),
    })
}

/// Execute a single command on the harness.
pub async fn execute_command(harness: &mut TestHarness, cmd: AgentCommand) -> CommandResponse {
    let app = &mut harness.app;
    match cmd {
        AgentCommand::AddPrimitive { kind, position } => {
            id_response(controller::add_primitive(app, kind, position.map(Vec3::from_array)))
        }

        AgentCommand::ToggleTool { mode } => {
            controller::toggle_tool(app, mode);
            CommandResponse::ok_with_data(serde_json::json!({ "tool": app.tool.active() }))
        }

        AgentCommand::Cancel => {
            controller::cancel_tool(app);
            CommandResponse::ok()
        }

        AgentCommand::ToggleStraightLines => {
            controller::toggle_straight_lines(app);
            CommandResponse::ok_with_data(
                serde_json::json!({ "straight_lines": app.tool.straight_lines() }),
            )
        }

        AgentCommand::KeyDown { key } => done(controller::key_down(app, key)),

        AgentCommand::PointerDown { origin, direction } => done(controller::pointer_down(
            app,
            PointerRay::new(Vec3::from_array(origin), Vec3::from_array(direction)),
        )),

        AgentCommand::PointerMove { origin, direction } => {
            controller::pointer_move(
                app,
                PointerRay::new(Vec3::from_array(origin), Vec3::from_array(direction)),
            );
            CommandResponse::ok()
        }

        AgentCommand::PointerUp => done(controller::pointer_up(app)),

        AgentCommand::ClickAt { point } => done(harness.click_from_above(Vec3::from_array(point))),

        AgentCommand::Stroke { points } => {
            let points: Vec<Vec3> = points.into_iter().map(Vec3::from_array).collect();
            done(harness.stroke(&points))
        }

        AgentCommand::Shapeify => id_response(controller::shapeify(app)),

        AgentCommand::Merge => id_response(controller::merge_all(app)),

        AgentCommand::DeleteSelected => done(controller::delete_selected(app)),

        AgentCommand::Clear => done(controller::clear_all(app, false)),

        AgentCommand::SetTransform { id, transform } => {
            done(controller::set_transform(app, &id, transform))
        }

        AgentCommand::LookFrom { eye, target } => {
            app.camera = ArcBallCamera::look_from(Vec3::from_array(eye), Vec3::from_array(target));
            CommandResponse::ok()
        }

        AgentCommand::ShowRepeatPrompt { prompt } => {
            app.replay.show_prompt(prompt);
            CommandResponse::ok_with_data(
                serde_json::json!({ "repeat_prompt": app.replay.prompt() }),
            )
        }

        AgentCommand::Repeat { distance } => {
            let d = distance.unwrap_or(app.settings.replay.default_distance);
            match harness.repeat(d) {
                Ok(()) => CommandResponse::ok_with_data(serde_json::json!({ "repeated": true })),
                Err(e) if e.is_fatal() => CommandResponse::err(e.to_string()),
                Err(e) => CommandResponse::ok_with_data(
                    serde_json::json!({ "repeated": false, "reason": e.to_string() }),
                ),
            }
        }

        AgentCommand::RepeatMany { count, distance } => {
            let d = distance.unwrap_or(app.settings.replay.default_distance);
            match harness.repeat_many(count, d, None).await {
                Ok(report) => CommandResponse::ok_with_data(serde_json::json!({
                    "attempts": report.attempts.len(),
                    "succeeded": report.succeeded(),
                    "cancelled": report.cancelled,
                })),
                Err(e) if e.is_fatal() => CommandResponse::err(e.to_string()),
                Err(e) => CommandResponse::ok_with_data(serde_json::json!({
                    "attempts": 0,
                    "succeeded": 0,
                    "cancelled": false,
                    "reason": e.to_string(),
                })),
            }
        }

        AgentCommand::SaveProject { name } => {
            controller::save_project(app, name.as_deref());
            CommandResponse::ok_with_data(
                serde_json::json!({ "project": app.projects.current_name() }),
            )
        }

        AgentCommand::LoadProject { name } => done(controller::load_project(app, &name)),

        AgentCommand::DeleteProject { name } => done(controller::delete_project(app, &name)),

        AgentCommand::NewProject => done(controller::new_project(app)),

        AgentCommand::ListProjects => CommandResponse::ok_with_data(serde_json::json!({
            "current": app.projects.current_name(),
            "projects": app.projects.names(),
        })),

        AgentCommand::ImportProject { project } => match serde_json::to_string(&project) {
            Ok(json) => done(controller::import_project_json(app, &json)),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        AgentCommand::ExportProject => {
            let project = persistence::to_project_file(app.projects.current_name(), &app.registry);
            match serde_json::to_value(&project) {
                Ok(value) => CommandResponse::ok_with_data(serde_json::json!({ "project": value })),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        AgentCommand::ExportStl { path } => {
            let meshes = export::baked_meshes(&app.registry);
            let facets: usize = meshes.iter().map(|(_, m)| m.triangle_count()).sum();
            let bytes = match export::build_stl(&meshes) {
                Ok(bytes) => bytes,
                Err(e) => return CommandResponse::err(format!("Failed to encode STL: {e}")),
            };
            if let Some(path) = &path {
                if let Err(e) = std::fs::write(path, &bytes) {
                    return CommandResponse::err(format!("Failed to write {path}: {e}"));
                }
                app.notify("STL file exported successfully!");
            }
            CommandResponse::ok_with_data(serde_json::json!({
                "facets": facets,
                "bytes": bytes.len(),
                "path": path,
            }))
        }

        AgentCommand::Inspect => CommandResponse::ok_with_data(inspect(harness)),

        AgentCommand::Notifications => {
            let messages = harness.notifications.messages();
            harness.notifications.clear();
            CommandResponse::ok_with_data(serde_json::json!({ "messages": messages }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub async fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: AgentCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd).await)
}

/// Parse and execute multiple JSON commands (array).
pub async fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<AgentCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    let mut responses = Vec::with_capacity(cmds.len());
    for cmd in cmds {
        responses.push(execute_command(harness, cmd).await);
    }
    Ok(responses)
}
