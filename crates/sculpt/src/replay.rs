//! Single-slot record of the last operation and the repeat engine that
//! replays it at a spatial offset.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::EditError;
use crate::ops::{self, PrimitiveKind, SketchProfile};
use crate::state::AppState;

/// Replayable operation with its spatial reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LastOperation {
    PlaneSplit { point: Vec3, normal: Vec3 },
    CustomSplit { point: Vec3, normal: Vec3 },
    CircularBore { point: Vec3, view_origin: Vec3 },
    FreeformCut(SketchProfile),
    FreehandShape { points: Vec<Vec3> },
    PrimitiveCircle { position: Vec3, radius: f32, lying_flat: bool },
    PrimitiveRing { position: Vec3 },
}

impl LastOperation {
    /// Carves get the multi-repeat option, shapes only the single repeat
    pub fn is_carve(&self) -> bool {
        matches!(
            self,
            LastOperation::PlaneSplit { .. }
                | LastOperation::CustomSplit { .. }
                | LastOperation::CircularBore { .. }
                | LastOperation::FreeformCut(_)
        )
    }
}

/// Visibility state of the repeat prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatPrompt {
    #[default]
    Hidden,
    /// Choice between a single repeat and equally spaced repeats
    Choices,
    /// Single repeat, distance input
    Normal,
    /// Multi-repeat, count and distance inputs
    Equal,
}

#[derive(Debug, Clone, Default)]
pub struct ReplayEngine {
    last: Option<LastOperation>,
    prompt: RepeatPrompt,
}

impl ReplayEngine {
    /// Overwrite the slot and offer to repeat it
    pub fn record(&mut self, op: LastOperation) {
        tracing::debug!("recorded {:?}", op);
        self.last = Some(op);
        self.prompt = RepeatPrompt::Choices;
    }

    pub fn last(&self) -> Option<&LastOperation> {
        self.last.as_ref()
    }

    pub fn prompt(&self) -> RepeatPrompt {
        self.prompt
    }

    pub fn hide_prompt(&mut self) {
        self.prompt = RepeatPrompt::Hidden;
    }

    /// Switch the visible prompt panel. Equal spacing is only offered for carves.
    pub fn show_prompt(&mut self, prompt: RepeatPrompt) {
        if self.last.is_none() {
            return;
        }
        if prompt == RepeatPrompt::Equal && !self.offers_equal_spacing() {
            return;
        }
        self.prompt = prompt;
    }

    pub fn offers_equal_spacing(&self) -> bool {
        self.last.as_ref().is_some_and(LastOperation::is_carve)
    }

    pub fn prompt_title(&self) -> Option<&'static str> {
        if self.prompt == RepeatPrompt::Hidden {
            return None;
        }
        self.last.as_ref().map(|op| {
            if op.is_carve() {
                "Repeat last carve?"
            } else {
                "Repeat last shape?"
            }
        })
    }

    /// Move the spatial reference after a successful repeat
    fn advance(&mut self, op: LastOperation) {
        self.last = Some(op);
    }
}

/// Outcome of `repeat_many`
#[derive(Debug, Default)]
pub struct RepeatReport {
    /// One entry per attempted repeat, in order
    pub attempts: Vec<Result<(), EditError>>,
    pub cancelled: bool,
}

impl RepeatReport {
    pub fn succeeded(&self) -> usize {
        self.attempts.iter().filter(|r| r.is_ok()).count()
    }
}

/// Zero or non-finite distances fall back to the configured default
fn effective_distance(app: &AppState, distance: f32) -> f32 {
    if distance.is_finite() && distance != 0.0 {
        distance
    } else {
        app.settings.replay.default_distance
    }
}

/// Shape under `offset`, found by a ray cast straight down from above it
fn probe(app: &AppState, offset: Vec3) -> Option<String> {
    let origin = offset + Vec3::Y * app.settings.replay.probe_height;
    app.pick(origin, Vec3::NEG_Y).map(|hit| hit.shape_id)
}

fn repeat_split(app: &mut AppState, offset: Vec3, normal: Vec3) -> Result<(), EditError> {
    let target = probe(app, offset).ok_or(EditError::NoTarget)?;
    let separation = app.settings.carve.split_separation;
    ops::plane_split(&mut app.registry, &target, offset, normal, separation)?;
    Ok(())
}

const NOTHING_TO_REPEAT: &str = "Nothing to repeat yet. Carve or draw something first!";

/// Repeat the recorded operation once, `distance` away from its last location.
///
/// Every outcome is reported through the notifier. Only fatal errors need
/// handling by the caller; on failure the record is left where it was.
pub fn repeat_once(app: &mut AppState, distance: f32) -> Result<(), EditError> {
    let Some(op) = app.replay.last().cloned() else {
        tracing::debug!("repeat requested with an empty record");
        app.notify(NOTHING_TO_REPEAT);
        return Err(EditError::NothingToRepeat);
    };
    let d = effective_distance(app, distance);
    let right = app.camera.right_vector();

    let result = match op {
        LastOperation::PlaneSplit { point, normal } => {
            let offset = point + normal * d;
            repeat_split(app, offset, normal).map(|_| LastOperation::PlaneSplit {
                point: offset,
                normal,
            })
        }
        LastOperation::CustomSplit { point, normal } => {
            let offset = point + normal * d;
            repeat_split(app, offset, normal).map(|_| LastOperation::CustomSplit {
                point: offset,
                normal,
            })
        }
        LastOperation::CircularBore { point, view_origin } => {
            let offset = point + right * d;
            probe(app, offset)
                .ok_or(EditError::NoTarget)
                .and_then(|target| {
                    ops::circular_bore(
                        &mut app.registry,
                        app.csg.as_ref(),
                        &target,
                        offset,
                        view_origin,
                        &app.settings.carve,
                    )
                })
                .map(|_| LastOperation::CircularBore {
                    point: offset,
                    view_origin,
                })
        }
        LastOperation::FreeformCut(profile) => {
            let moved = profile.moved_to(profile.center + right * d);
            ops::freeform_cut(&mut app.registry, app.csg.as_ref(), &moved, &app.settings.carve)
                .map(|_| LastOperation::FreeformCut(moved))
        }
        LastOperation::FreehandShape { points } => {
            let shifted: Vec<Vec3> = points.iter().map(|p| *p + right * d).collect();
            ops::add_tube(&mut app.registry, &shifted, &app.settings)
                .map(|_| LastOperation::FreehandShape { points: shifted })
        }
        LastOperation::PrimitiveCircle {
            position,
            radius,
            lying_flat,
        } => {
            let position = position + right * d;
            let shape = ops::circle_shape(position, radius, lying_flat, &app.settings);
            app.registry.add(shape).map(|_| LastOperation::PrimitiveCircle {
                position,
                radius,
                lying_flat,
            })
        }
        LastOperation::PrimitiveRing { position } => {
            let position = position + right * d;
            ops::add_primitive(&mut app.registry, PrimitiveKind::Ring, Some(position), &app.settings)
                .map(|_| LastOperation::PrimitiveRing { position })
        }
    };

    app.prune_selection();
    let kind = app.replay.last().cloned();

    match result {
        Ok(moved) => {
            let message = match &moved {
                LastOperation::PlaneSplit { .. }
                | LastOperation::CustomSplit { .. }
                | LastOperation::CircularBore { .. } => format!("Carve repeated {d}cm away!"),
                LastOperation::FreeformCut(_) => format!("Sketch carve repeated {d}cm away!"),
                LastOperation::FreehandShape { .. } => format!("Drawn shape repeated {d}cm away!"),
                LastOperation::PrimitiveCircle { .. } => format!("Circle repeated {d}cm away!"),
                LastOperation::PrimitiveRing { .. } => format!("Ring repeated {d}cm away!"),
            };
            tracing::info!("repeat advanced to {:?}", moved);
            app.replay.advance(moved);
            app.notify(&message);
            Ok(())
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            let message = match (&kind, &e) {
                (Some(LastOperation::FreeformCut(_)), EditError::NoIntersection) => {
                    "Repeated sketch didn't intersect any design.".to_string()
                }
                (_, EditError::NoTarget | EditError::NoIntersection) => {
                    "Could not find a design at the offset distance.".to_string()
                }
                _ => e.to_string(),
            };
            tracing::info!("repeat failed: {e}");
            app.notify(&message);
            Err(e)
        }
    }
}

fn is_cancelled(cancel: &Option<watch::Receiver<bool>>) -> bool {
    cancel.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Repeat the recorded operation `count` times, `distance` apart, pausing
/// between iterations. Failed attempts are reported and the loop goes on;
/// a `true` on `cancel` stops it at the next pause.
pub async fn repeat_many(
    app: &mut AppState,
    count: u32,
    distance: f32,
    cancel: Option<watch::Receiver<bool>>,
) -> Result<RepeatReport, EditError> {
    if app.replay.last().is_none() {
        app.notify(NOTHING_TO_REPEAT);
        return Err(EditError::NothingToRepeat);
    }

    app.replay.hide_prompt();
    app.notify(&format!("Applying {count} repeated carves..."));
    let pacing = Duration::from_millis(app.settings.replay.repeat_pacing_ms);

    let mut report = RepeatReport::default();
    for i in 0..count {
        if is_cancelled(&cancel) {
            tracing::info!("repeat cancelled after {i} of {count}");
            report.cancelled = true;
            break;
        }
        match repeat_once(app, distance) {
            Err(e) if e.is_fatal() => return Err(e),
            outcome => report.attempts.push(outcome),
        }
        tokio::time::sleep(pacing).await;
    }

    if !report.cancelled {
        app.notify(&format!("Finished {count} repeated carves!"));
    }
    Ok(report)
}
