use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use eframe::egui::{self, Context, Pos2, Sense};

use crate::arrows::ArrowQueue;
use crate::config::VisualizerConfig;
use crate::mesh::{Simulation, TrafficDriver};

mod clock;
mod input;
mod render;
mod render_utils;
mod selection;

use clock::AnimationClock;
use render::ToolbarFont;
use render_utils::Projection;
use selection::{SelectionState, Toolbar};

pub struct VisualizerApp {
    model: ViewModel,
    pending_presses: VecDeque<Pos2>,
    _traffic: Option<TrafficDriver>,
}

/// Everything the per-frame pipeline reads and the input dispatcher mutates.
struct ViewModel {
    simulation: Arc<dyn Simulation>,
    arrows: ArrowQueue,
    selection: SelectionState,
    toolbar: Toolbar,
    clock: AnimationClock,
    font: ToolbarFont,
    node_hit_half_extent: f32,
}

impl ViewModel {
    fn new(simulation: Arc<dyn Simulation>, arrows: ArrowQueue, config: &VisualizerConfig) -> Self {
        Self {
            clock: AnimationClock::new(
                config.starting_ring_radius,
                config.ring_speed,
                simulation.max_broadcast_range(),
            ),
            simulation,
            arrows,
            selection: SelectionState::default(),
            toolbar: Toolbar::new(config.toolbar_items.clone(), config.toolbar_height as f32),
            font: ToolbarFont::new(),
            node_hit_half_extent: config.node_hit_half_extent,
        }
    }
}

impl VisualizerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &VisualizerConfig,
        simulation: Arc<dyn Simulation>,
        arrows: ArrowQueue,
        traffic: Option<TrafficDriver>,
    ) -> Self {
        // style and fonts are set up once per session
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        Self {
            model: ViewModel::new(simulation, arrows, config),
            pending_presses: VecDeque::new(),
            _traffic: traffic,
        }
    }

    fn collect_presses(&mut self, ctx: &Context) {
        ctx.input(|input| {
            for event in &input.events {
                if let egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed: true,
                    ..
                } = event
                {
                    self.pending_presses.push_back(*pos);
                }
            }
        });
    }
}

impl eframe::App for VisualizerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.collect_presses(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (rect, _response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
                let projection = Projection::new(rect);

                if let Some(press) = self.pending_presses.pop_front() {
                    self.model.dispatch_press(press, &projection);
                }

                let commands = self.model.render_frame(&projection, Instant::now());
                let painter = ui.painter_at(rect);
                self.model.present(&painter, &commands);
            });

        // the range rings animate continuously
        ctx.request_repaint();
    }
}
