//! Replays an event script through a headless viewer.

use crate::script::Step;
use crossplanes_assets::TextureImage;
use crossplanes_common::SurfaceSize;
use crossplanes_render::{FrameHost, FrameRecord, HeadlessTarget, SchedulerStats};
use crossplanes_scene::SceneConfig;
use crossplanes_viewer::{Viewer, ViewerEvent};
use std::cell::Cell;

/// Stands in for the display: counts scheduled callbacks until a tick.
#[derive(Debug, Default)]
struct ScriptHost {
    scheduled: Cell<usize>,
}

impl FrameHost for ScriptHost {
    fn schedule_frame(&self) {
        self.scheduled.set(self.scheduled.get() + 1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Every frame drawn, the startup frame included.
    pub frames: Vec<FrameRecord>,
    /// Frames drawn on each tick, in order.
    pub frames_per_tick: Vec<usize>,
    pub stats: SchedulerStats,
}

fn solid_texture(size: SurfaceSize) -> TextureImage {
    let (width, height) = (size.width.max(1), size.height.max(1));
    TextureImage {
        width,
        height,
        pixels: vec![128; width as usize * height as usize * 4],
    }
}

/// Run `steps` against a viewer laid out at `layout`. A final tick is added
/// if a frame is still pending when the script ends.
pub fn simulate(config: &SceneConfig, layout: SurfaceSize, steps: &[Step]) -> SimulationReport {
    let host = ScriptHost::default();
    let mut viewer = Viewer::new(config, HeadlessTarget::new(layout));
    let mut frames_per_tick = Vec::new();

    viewer.start();

    let tick = |viewer: &mut Viewer<HeadlessTarget>| {
        let callbacks = host.scheduled.replace(0);
        (0..callbacks).filter(|_| viewer.on_frame().is_some()).count()
    };

    for step in steps {
        let outcome = match *step {
            Step::Tick => {
                let drawn = tick(&mut viewer);
                tracing::debug!(tick = frames_per_tick.len() + 1, drawn, "tick");
                frames_per_tick.push(drawn);
                continue;
            }
            Step::Resize(size) => {
                viewer.target_mut().set_layout_size(size);
                viewer.handle(ViewerEvent::Resized, &host)
            }
            Step::Input(input) => viewer.handle(ViewerEvent::Input(input), &host),
            Step::Texture { id, size } => viewer.handle(
                ViewerEvent::TextureLoaded {
                    id,
                    image: solid_texture(size),
                },
                &host,
            ),
            Step::Reset => viewer.handle(ViewerEvent::ResetView, &host),
        };
        tracing::trace!(?step, ?outcome, "step");
    }

    if viewer.scheduler().is_pending() {
        frames_per_tick.push(tick(&mut viewer));
    }

    SimulationReport {
        frames: viewer.target().frames().to_vec(),
        frames_per_tick,
        stats: viewer.scheduler().stats(),
    }
}
