//! Event handlers: pointer gestures, tool toggles, palette actions and
//! project management, all applied to one `AppState`.
//!
//! Handlers return `Err` only for fatal scene-sink failures. Everything
//! else ends up as a user notification.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{ShapeId, Transform};

use crate::error::{EditError, PersistenceError};
use crate::ops::{self, PrimitiveKind, SketchProfile};
use crate::persistence;
use crate::replay::LastOperation;
use crate::state::draw::is_nearly_planar;
use crate::state::{AppState, CircleDraft, GizmoMode, ToolMode};
use crate::viewport::picking::{ray_plane, Ray};

/// World-space pointer ray
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl PointerRay {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    fn ray(&self) -> Ray {
        Ray::new(self.origin, self.direction)
    }

    fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Delete,
    Backspace,
}

/// Notify a recoverable error and swallow it; pass fatal ones through
fn settle<T>(app: &mut AppState, result: Result<T, EditError>) -> Result<Option<T>, EditError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_fatal() => {
            tracing::error!("{e}");
            Err(e)
        }
        Err(e) => {
            tracing::debug!("recovered: {e}");
            app.notify(&e.to_string());
            Ok(None)
        }
    }
}

fn settle_persistence<T>(
    app: &mut AppState,
    result: Result<T, PersistenceError>,
) -> Result<Option<T>, EditError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(PersistenceError::Edit(e)) => settle(app, Err(e)),
        Err(e) => {
            tracing::warn!("{e}");
            app.notify(&e.to_string());
            Ok(None)
        }
    }
}

// ── Tools ────────────────────────────────────────────────────

pub fn toggle_tool(app: &mut AppState, mode: ToolMode) {
    app.reset_gestures();
    let message = app.tool.toggle(mode);
    app.notify(message);
}

/// Escape: back to Select
pub fn cancel_tool(app: &mut AppState) {
    app.reset_gestures();
    let message = app.tool.cancel();
    app.notify(message);
}

pub fn toggle_straight_lines(app: &mut AppState) {
    let message = app.tool.toggle_straight_lines();
    app.notify(message);
}

pub fn key_down(app: &mut AppState, key: Key) -> Result<(), EditError> {
    match key {
        Key::Escape => {
            cancel_tool(app);
            Ok(())
        }
        Key::Delete | Key::Backspace => delete_selected(app),
    }
}

// ── Pointer gestures ─────────────────────────────────────────

pub fn pointer_down(app: &mut AppState, pointer: PointerRay) -> Result<(), EditError> {
    app.replay.hide_prompt();
    let hit = app.pick(pointer.origin, pointer.direction);

    match app.tool.active() {
        ToolMode::Select => match hit {
            Some(hit) => app.selection.attach(hit.shape_id, GizmoMode::Translate),
            None => app.selection.detach(),
        },
        ToolMode::Scale => match hit {
            Some(hit) => {
                app.selection.attach(hit.shape_id, GizmoMode::Scale);
                app.notify("Drag the X, Y, or Z handles to make it shorter or fatter!");
            }
            None => app.selection.detach(),
        },
        ToolMode::Carve => match hit {
            Some(hit) => carve_at(app, &hit.shape_id, hit.point)?,
            None => {
                settle(app, Err::<(), _>(EditError::NoTarget))?;
            }
        },
        ToolMode::CircleCarve => match hit {
            Some(hit) => bore_at(app, &hit.shape_id, hit.point)?,
            None => {
                settle(app, Err::<(), _>(EditError::NoTarget))?;
            }
        },
        ToolMode::Bend => {
            let k = app.settings.shaping.bend_k;
            let bent = hit
                .ok_or(EditError::NoTarget)
                .and_then(|hit| ops::bend_shape(&mut app.registry, &hit.shape_id, k));
            if settle(app, bent)?.is_some() {
                app.notify("Shape curved and bent!");
            }
        }
        ToolMode::CircleDraw => {
            let center = hit
                .map(|h| h.point)
                .or_else(|| ray_plane(&pointer.ray(), Vec3::ZERO, Vec3::Y));
            app.circle_draft = center.map(CircleDraft::new);
        }
        ToolMode::Draw | ToolMode::SketchCarve => {
            app.draw.begin();
            let straight = app.tool.straight_lines();
            app.draw.push(pointer.at(app.settings.draw.draw_depth), straight);
        }
    }
    Ok(())
}

pub fn pointer_move(app: &mut AppState, pointer: PointerRay) {
    match app.tool.active() {
        ToolMode::CircleDraw => {
            if let Some(draft) = app.circle_draft.as_mut() {
                if let Some(on_plane) = ray_plane(&pointer.ray(), draft.center, Vec3::Y) {
                    draft.update(on_plane);
                }
            }
        }
        mode if mode.collects_strokes() => {
            let straight = app.tool.straight_lines();
            app.draw.push(pointer.at(app.settings.draw.draw_depth), straight);
        }
        _ => {}
    }
}

pub fn pointer_up(app: &mut AppState) -> Result<(), EditError> {
    match app.tool.active() {
        ToolMode::CircleDraw => finish_circle(app),
        ToolMode::SketchCarve => finish_sketch_carve(app),
        ToolMode::Draw => {
            if app.draw.is_active() {
                app.draw.end();
                let draw = &app.settings.draw;
                if is_nearly_planar(app.draw.points(), draw.planar_min_points, draw.planar_threshold) {
                    app.notify("Great now it's time to make the design 3D!");
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn carve_at(app: &mut AppState, target: &str, point: Vec3) -> Result<(), EditError> {
    let separation = app.settings.carve.split_separation;

    if app.tool.straight_lines() {
        let forward = app.camera.forward();
        let normal = Vec3::new(forward.x, 0.0, forward.z)
            .try_normalize()
            .or_else(|| {
                let up = app.camera.up_vector();
                Vec3::new(up.x, 0.0, up.z).try_normalize()
            })
            .unwrap_or(Vec3::Z);
        let split = ops::plane_split(&mut app.registry, target, point, normal, separation);
        if settle(app, split)?.is_some() {
            app.prune_selection();
            app.notify("Shape carved with a straight line!");
            app.replay.record(LastOperation::CustomSplit { point, normal });
        }
    } else {
        let split = ops::plane_split(&mut app.registry, target, point, Vec3::Y, separation);
        if settle(app, split)?.is_some() {
            app.prune_selection();
            app.notify("Shape carved and split into two!");
            app.replay.record(LastOperation::PlaneSplit {
                point,
                normal: Vec3::Y,
            });
        }
    }
    Ok(())
}

fn bore_at(app: &mut AppState, target: &str, point: Vec3) -> Result<(), EditError> {
    let view_origin = app.camera.eye_position();
    let bore = ops::circular_bore(
        &mut app.registry,
        app.csg.as_ref(),
        target,
        point,
        view_origin,
        &app.settings.carve,
    );
    if settle(app, bore)?.is_some() {
        app.prune_selection();
        app.notify("Perfect circular hole carved!");
        app.replay.record(LastOperation::CircularBore { point, view_origin });
    }
    Ok(())
}

fn finish_circle(app: &mut AppState) -> Result<(), EditError> {
    let Some(draft) = app.circle_draft.take() else {
        return Ok(());
    };
    if draft.radius <= app.settings.shaping.circle_min_radius {
        tracing::debug!("circle radius {} too small", draft.radius);
        return Ok(());
    }

    let shape = ops::circle_shape(draft.center, draft.radius, true, &app.settings);
    let added = app.registry.add(shape);
    if settle(app, added)?.is_some() {
        app.notify("Perfect circle design created!");
        app.replay.record(LastOperation::PrimitiveCircle {
            position: draft.center,
            radius: draft.radius,
            lying_flat: true,
        });
    }
    Ok(())
}

fn finish_sketch_carve(app: &mut AppState) -> Result<(), EditError> {
    if !app.draw.is_active() {
        return Ok(());
    }
    let points = app.draw.take();
    let direction = app.camera.forward();

    let profile = SketchProfile::from_stroke(&points, direction);
    let Some(profile) = settle(app, profile)? else {
        return Ok(());
    };

    match ops::freeform_cut(&mut app.registry, app.csg.as_ref(), &profile, &app.settings.carve) {
        Ok(carved) => {
            tracing::info!("sketch carved {carved} shapes");
            app.prune_selection();
            app.notify("Custom shape carved successfully!");
            app.replay.record(LastOperation::FreeformCut(profile));
        }
        Err(EditError::NoIntersection) => app.notify("Sketch didn't intersect any design."),
        Err(e) => {
            settle::<()>(app, Err(e))?;
        }
    }
    Ok(())
}

// ── Palette actions ──────────────────────────────────────────

/// Turn the finished stroke into a tube
pub fn shapeify(app: &mut AppState) -> Result<Option<ShapeId>, EditError> {
    let points = app.draw.points().to_vec();
    let tube = ops::add_tube(&mut app.registry, &points, &app.settings);
    let id = settle(app, tube)?;
    if id.is_some() {
        app.draw.clear();
        app.replay.record(LastOperation::FreehandShape { points });
    }
    Ok(id)
}

pub fn add_primitive(
    app: &mut AppState,
    kind: PrimitiveKind,
    position: Option<Vec3>,
) -> Result<Option<ShapeId>, EditError> {
    let added = ops::add_primitive(&mut app.registry, kind, position, &app.settings);
    let Some(id) = settle(app, added)? else {
        return Ok(None);
    };

    let placed = app
        .registry
        .get(&id)
        .map(|s| glam::DVec3::from_array(s.transform.position).as_vec3())
        .unwrap_or_default();
    match kind {
        PrimitiveKind::Circle => app.replay.record(LastOperation::PrimitiveCircle {
            position: placed,
            radius: 0.5,
            lying_flat: false,
        }),
        PrimitiveKind::Ring => app.replay.record(LastOperation::PrimitiveRing { position: placed }),
        _ => {}
    }
    Ok(Some(id))
}

pub fn merge_all(app: &mut AppState) -> Result<Option<ShapeId>, EditError> {
    let color = app.settings.colors.default_color;
    let merged = ops::merge_all(&mut app.registry, color);
    let id = settle(app, merged)?;
    if id.is_some() {
        app.selection.detach();
        app.notify("Designs connected into a single object!");
    }
    Ok(id)
}

pub fn delete_selected(app: &mut AppState) -> Result<(), EditError> {
    let Some(id) = app.selection.selected().cloned() else {
        app.notify("Select a shape first! (Use the Select Tool)");
        return Ok(());
    };
    app.selection.detach();
    let removed = app.registry.remove(&id);
    if let Some(Some(shape)) = settle(app, removed)? {
        app.notify(&format!("{} deleted.", shape.name));
    }
    Ok(())
}

/// Remove every shape; `silent` skips the notification
pub fn clear_all(app: &mut AppState, silent: bool) -> Result<(), EditError> {
    app.selection.detach();
    app.registry.clear()?;
    if !silent {
        app.notify("Design cleared.");
    }
    Ok(())
}

/// Apply a gizmo drag result
pub fn set_transform(app: &mut AppState, id: &str, transform: Transform) -> Result<(), EditError> {
    let result = app
        .registry
        .get_mut(id)
        .map(|shape| shape.transform = transform)
        .ok_or(EditError::NoTarget);
    settle(app, result)?;
    Ok(())
}

// ── Projects ─────────────────────────────────────────────────

/// Save under `name`, or under the current project name
pub fn save_project(app: &mut AppState, name: Option<&str>) {
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| app.projects.current_name().to_string());
    let project = persistence::to_project_file(&name, &app.registry);
    app.projects.save(&name, project);
    app.notify(&format!("Project \"{name}\" saved!"));
}

pub fn load_project(app: &mut AppState, name: &str) -> Result<(), EditError> {
    let opened = app.projects.open_project(name);
    let Some(project) = settle_persistence(app, opened)? else {
        return Ok(());
    };
    app.reset_gestures();
    let loaded = persistence::load_project(&mut app.registry, &project);
    if settle_persistence(app, loaded)?.is_some() {
        app.notify(&format!("Loaded \"{name}\""));
    }
    Ok(())
}

/// Load a project document that is not part of the library
pub fn import_project_json(app: &mut AppState, json: &str) -> Result<(), EditError> {
    app.reset_gestures();
    let loaded = persistence::load_project_json(&mut app.registry, json);
    if let Some(project) = settle_persistence(app, loaded)? {
        app.notify(&format!("Loaded \"{}\"", project.name));
    }
    Ok(())
}

pub fn delete_project(app: &mut AppState, name: &str) -> Result<(), EditError> {
    let deleted = app.projects.delete(name);
    if settle_persistence(app, deleted)?.is_some() {
        clear_all(app, true)?;
        app.notify("Project deleted.");
    }
    Ok(())
}

pub fn new_project(app: &mut AppState) -> Result<(), EditError> {
    app.reset_gestures();
    clear_all(app, true)?;
    app.projects.start_new();
    app.notify("New Project started.");
    Ok(())
}
