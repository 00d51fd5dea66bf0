use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Result;
use depgraph_view::bus::EventBus;
use depgraph_view::config::LayoutConfig;
use depgraph_view::graph::{Graph, load_graph_file, sample_graph};
use depgraph_view::layout::{
    ColorAssignment, DragController, ForceConfig, MarkerSet, Simulation, SimulationConfig,
    Viewport,
};
use eframe::egui::{self, Context};
use tracing::{error, info};

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<Graph, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphSource {
    Sample,
    File(PathBuf),
}

impl GraphSource {
    fn load(&self) -> Result<Graph> {
        match self {
            Self::Sample => sample_graph(),
            Self::File(path) => load_graph_file(path),
        }
    }
}

impl fmt::Display for GraphSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sample => f.write_str("bundled sample"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

struct LoadRequest {
    source: GraphSource,
}

pub struct GraphViewerApp {
    source: GraphSource,
    config: LayoutConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
    requests: EventBus<LoadRequest>,
    started: Rc<RefCell<Option<Receiver<LoadResult>>>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LabelMode {
    FullId,
    Name,
    Hidden,
}

struct ViewModel {
    simulation: Simulation,
    drag: DragController,
    viewport: Option<Viewport>,
    colors: ColorAssignment,
    markers: MarkerSet,
    config: LayoutConfig,
    label_mode: LabelMode,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    panning: bool,
    tuning_hot: bool,
    reload_error: Option<String>,
}

struct SearchMatchCache {
    query: String,
    matches: HashSet<usize>,
}

impl ViewModel {
    fn new(graph: Graph, config: LayoutConfig) -> Self {
        let colors = ColorAssignment::for_graph(&graph);
        Self {
            simulation: Simulation::new(graph, config.forces, config.simulation),
            drag: DragController::new(),
            viewport: None,
            colors,
            markers: MarkerSet::default(),
            config,
            label_mode: LabelMode::FullId,
            search: String::new(),
            search_match_cache: None,
            panning: false,
            tuning_hot: false,
            reload_error: None,
        }
    }

    fn replace_graph(&mut self, graph: Graph) {
        self.simulation.stop();
        self.colors = ColorAssignment::for_graph(&graph);
        self.simulation.restart(graph);
        self.drag = DragController::new();
        self.search_match_cache = None;
        self.reload_error = None;
    }

    fn forces(&self) -> ForceConfig {
        *self.simulation.force_config()
    }

    fn simulation_config(&self) -> SimulationConfig {
        *self.simulation.config()
    }
}

impl GraphViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: GraphSource,
        config: LayoutConfig,
    ) -> Self {
        let started = Rc::new(RefCell::new(None));
        let mut requests = EventBus::new();
        {
            let started = Rc::clone(&started);
            requests.subscribe(move |request: &LoadRequest| {
                *started.borrow_mut() = Some(Self::spawn_load(request.source.clone()));
            });
        }

        requests.publish(&LoadRequest {
            source: source.clone(),
        });
        let state = match started.borrow_mut().take() {
            Some(rx) => AppState::Loading { rx },
            None => AppState::Error("Graph loader did not start".to_owned()),
        };

        Self {
            source,
            config,
            state,
            reload_rx: None,
            requests,
            started,
        }
    }

    fn spawn_load(source: GraphSource) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        info!(source = %source, "loading graph");
        thread::spawn(move || {
            let result = source.load().map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn request_load(&mut self) -> Option<Receiver<LoadResult>> {
        self.requests.publish(&LoadRequest {
            source: self.source.clone(),
        });
        self.started.borrow_mut().take()
    }
}

impl eframe::App for GraphViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(graph)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            graph,
                            self.config,
                        ))));
                    }
                    Ok(Err(message)) => {
                        error!(%message, "graph load failed");
                        transition = Some(AppState::Error(message));
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading dependency graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(message) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load dependency graph");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    transition = Some(match self.request_load() {
                        Some(rx) => AppState::Loading { rx },
                        None => AppState::Error("Graph loader did not start".to_owned()),
                    });
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = self.request_load();
                }

                if let Some(rx) = self.reload_rx.take()
                    && let AppState::Ready(model) = &mut self.state
                {
                    match rx.try_recv() {
                        Ok(Ok(graph)) => model.replace_graph(graph),
                        Ok(Err(message)) => {
                            error!(%message, "graph reload failed; keeping current layout");
                            model.reload_error = Some(message);
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.reload_error =
                                Some("Background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            if let AppState::Ready(model) = &mut self.state {
                model.simulation.stop();
            }
            self.reload_rx = None;
            self.state = next_state;
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let AppState::Ready(model) = &mut self.state {
            model.simulation.stop();
        }
    }
}
