use std::collections::HashSet;

use depgraph_view::layout::{LINK_STROKE_WIDTH, LinkShape, Viewport, scene};
use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::{dim_color, draw_background, to_color32, to_screen};
use super::super::{LabelMode, SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn refresh_search_matches(&mut self) {
        let query = self.search.trim();
        if query.is_empty() {
            self.search_match_cache = None;
            return;
        }

        if self
            .search_match_cache
            .as_ref()
            .is_some_and(|cached| cached.query == query)
        {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .simulation
            .graph()
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| fuzzy_match_score(&matcher, node.id.as_str(), query).is_some())
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches,
        });
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        let viewport_config = self.config.viewport;
        let viewport = self.viewport.get_or_insert_with(|| {
            Viewport::new(rect.width() as f64, rect.height() as f64).with_config(viewport_config)
        });
        viewport.resize_device(rect.width() as f64, rect.height() as f64);
        let viewport = *viewport;

        draw_background(&painter, rect, &viewport);

        if self.simulation.tick().is_some() {
            ui.ctx().request_repaint();
        }

        let snapshot = self.simulation.snapshot();
        let scene = scene(
            self.simulation.graph(),
            &snapshot,
            &viewport,
            &self.colors,
            &self.markers,
        );

        self.handle_node_drag(ui, rect, &response, &scene);
        self.handle_graph_pan(&response);
        self.handle_graph_zoom(ui, rect, &response);
        if response.dragged() {
            ui.ctx().request_repaint();
        }

        let hovered = self.hovered_node(ui, rect, &scene);
        if hovered.is_some() || self.drag.active().is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::Grab;
            });
        }

        self.refresh_search_matches();
        let matches = self.search_match_cache.as_ref().map(|cache| &cache.matches);

        let link_color = Color32::from_rgba_unmultiplied(176, 182, 192, 180);
        let link_stroke = Stroke::new(
            (LINK_STROKE_WIDTH * viewport.uniform_scale()).clamp(0.5, 4.0) as f32,
            link_color,
        );
        for link in &scene.links {
            match link {
                LinkShape::Arc { points, marker, .. } => {
                    let points = points
                        .iter()
                        .map(|point| to_screen(rect, *point))
                        .collect::<Vec<_>>();
                    painter.add(Shape::line(points, link_stroke));

                    if let Some(marker) = marker {
                        painter.add(Shape::convex_polygon(
                            vec![
                                to_screen(rect, marker.tip),
                                to_screen(rect, marker.left),
                                to_screen(rect, marker.right),
                            ],
                            link_color,
                            Stroke::NONE,
                        ));
                    }
                }
                LinkShape::Point { at, .. } => {
                    painter.circle_filled(to_screen(rect, *at), link_stroke.width, link_color);
                }
            }
        }

        let graph = self.simulation.graph();
        for node in &scene.nodes {
            let center = to_screen(rect, node.center);
            let radius = node.radius as f32;
            let base_color = to_color32(node.color);
            let color = match matches {
                Some(matches) if !matches.contains(&node.index) => dim_color(base_color, 0.38),
                _ => base_color,
            };

            painter.circle_filled(center, radius, color);
            painter.circle_stroke(center, radius, Stroke::new(1.5, Color32::from_gray(235)));

            let is_hovered = hovered == Some(node.index);
            let is_dragged = self.drag.active() == Some(node.index);
            if is_hovered || is_dragged {
                painter.circle_stroke(
                    center,
                    radius + 4.0,
                    Stroke::new(1.6, Color32::from_rgba_unmultiplied(245, 206, 93, 200)),
                );
            }

            let label = match self.label_mode {
                LabelMode::FullId => Some(node.label.as_str()),
                LabelMode::Name => graph.node(node.index).map(|entry| entry.id.name()),
                LabelMode::Hidden => None,
            };
            if let Some(label) = label {
                painter.text(
                    to_screen(rect, node.label_anchor),
                    Align2::LEFT_CENTER,
                    label,
                    FontId::proportional(node.font_size as f32),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(index) = hovered
            && let Some(node) = graph.node(index)
        {
            let group = match node.id.group() {
                "" => "(root)",
                group => group,
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  group {group}  |  links {}", node.id, graph.degree(index)),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
