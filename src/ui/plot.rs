use eframe::egui::{
    self, pos2, Align2, Color32, FontId, Mesh, Pos2, Rect, Sense, Shape, Stroke, Ui,
};

use crate::color::Gradient;
use crate::render::projection::View;
use crate::render::Surface;
use crate::state::AppState;

const COLORBAR_STRIP: f32 = 90.0;
const DRAG_DEGREES_PER_POINT: f32 = 0.4;

// ---------------------------------------------------------------------------
// Surface plot (central panel)
// ---------------------------------------------------------------------------

/// Render the 3D surface in the central panel. Dragging rotates the view.
pub fn surface_plot(ui: &mut Ui, state: &mut AppState) {
    if state.surface.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a snapshot folder to plot  (File → Open folder…)");
        });
        return;
    }

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::drag());
    if response.dragged() {
        let delta = response.drag_delta();
        state
            .view
            .rotate(-delta.x * DRAG_DEGREES_PER_POINT, delta.y * DRAG_DEGREES_PER_POINT);
    }

    let Some(surface) = &state.surface else {
        return;
    };
    let rect = response.rect;
    let text_color = ui.visuals().text_color();
    let gradient = Gradient::blues();

    painter.text(
        pos2(rect.center().x, rect.top() + 16.0),
        Align2::CENTER_CENTER,
        &surface.title,
        FontId::proportional(18.0),
        text_color,
    );

    let plot_rect = Rect::from_min_max(
        pos2(rect.left(), rect.top() + 32.0),
        pos2(rect.right() - COLORBAR_STRIP, rect.bottom()),
    );
    let scene = Scene::new(surface, state.view, plot_rect);

    draw_frame(&painter, &scene, surface, text_color);
    if surface.is_degenerate() {
        draw_lines(&painter, &scene, surface, &gradient);
    } else {
        painter.add(Shape::mesh(surface_mesh(&scene, surface, &gradient)));
    }
    draw_labels(&painter, &scene, surface, text_color);
    draw_colorbar(&painter, rect, surface.z_max, &gradient, text_color);
}

// ---------------------------------------------------------------------------
// Scene – data coordinates → screen
// ---------------------------------------------------------------------------

/// Maps data coordinates (decimal year, version index, value) onto the
/// screen through the unit cube.
struct Scene {
    view: View,
    center: Pos2,
    scale: f32,
    x_min: f64,
    x_span: f64,
    y_span: f64,
    z_max: f64,
}

impl Scene {
    fn new(surface: &Surface, view: View, rect: Rect) -> Self {
        let (x_min, x_max) = surface.x_range();
        Scene {
            view,
            center: rect.center(),
            scale: rect.width().min(rect.height()) * 0.55,
            x_min,
            x_span: (x_max - x_min).max(f64::EPSILON),
            y_span: surface.versions.len().saturating_sub(1) as f64,
            z_max: surface.z_max.max(f64::EPSILON),
        }
    }

    /// Position inside the unit cube for a data point.
    fn unit(&self, x: f64, version: f64, value: f64) -> [f32; 3] {
        let y = if self.y_span > 0.0 {
            version / self.y_span
        } else {
            0.5
        };
        [
            ((x - self.x_min) / self.x_span) as f32,
            y as f32,
            (value / self.z_max) as f32,
        ]
    }

    /// Project a unit-cube point; returns screen position and depth.
    fn screen(&self, p: [f32; 3]) -> (Pos2, f32) {
        let projected = self.view.project(p);
        (
            pos2(
                self.center.x + projected.x * self.scale,
                self.center.y - projected.y * self.scale,
            ),
            projected.depth,
        )
    }

    fn data(&self, x: f64, version: f64, value: f64) -> (Pos2, f32) {
        self.screen(self.unit(x, version, value))
    }
}

// ---------------------------------------------------------------------------
// Drawing helpers
// ---------------------------------------------------------------------------

/// Depth-sorted (back to front) triangle mesh with per-vertex colours.
fn surface_mesh(scene: &Scene, surface: &Surface, gradient: &Gradient) -> Mesh {
    let mut cells: Vec<(f32, [(Pos2, Color32); 4])> = Vec::new();

    for v in 0..surface.versions.len() - 1 {
        for s in 0..surface.x.len() - 1 {
            let corners = [(v, s), (v, s + 1), (v + 1, s + 1), (v + 1, s)];
            let mut depth = 0.0;
            let vertices = corners.map(|(v, s)| {
                let value = surface.value(v, s);
                let (pos, d) = scene.data(surface.x[s], v as f64, value);
                depth += d;
                (pos, gradient.color32(value / scene.z_max))
            });
            cells.push((depth, vertices));
        }
    }
    cells.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut mesh = Mesh::default();
    for (_, vertices) in cells {
        let base = mesh.vertices.len() as u32;
        for (pos, color) in vertices {
            mesh.colored_vertex(pos, color);
        }
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }
    mesh
}

/// Fallback for one snapshot or one version: one polyline per version.
fn draw_lines(painter: &egui::Painter, scene: &Scene, surface: &Surface, gradient: &Gradient) {
    let color = gradient.color32(1.0);
    for (v, row) in surface.z.iter().enumerate() {
        let points: Vec<Pos2> = surface
            .x
            .iter()
            .zip(row)
            .map(|(&x, &value)| scene.data(x, v as f64, value).0)
            .collect();
        for p in &points {
            painter.circle_filled(*p, 3.0, color);
        }
        if points.len() > 1 {
            painter.add(Shape::line(points, Stroke::new(2.0, color)));
        }
    }
}

/// Cube outline plus floor grid lines at every tick.
fn draw_frame(painter: &egui::Painter, scene: &Scene, surface: &Surface, text_color: Color32) {
    let edge = Stroke::new(1.0, text_color.gamma_multiply(0.35));
    let grid = Stroke::new(0.5, text_color.gamma_multiply(0.15));
    let corner = |x: f32, y: f32, z: f32| scene.screen([x, y, z]).0;

    for &(a, b) in &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
        // verticals
        painter.line_segment([corner(a, b, 0.0), corner(a, b, 1.0)], edge);
    }
    for z in [0.0, 1.0] {
        let ring = vec![
            corner(0.0, 0.0, z),
            corner(1.0, 0.0, z),
            corner(1.0, 1.0, z),
            corner(0.0, 1.0, z),
        ];
        painter.add(Shape::closed_line(ring, edge));
    }

    for tick in &surface.x_ticks {
        let [ux, _, _] = scene.unit(tick.value, 0.0, 0.0);
        if (0.0..=1.0).contains(&ux) {
            painter.line_segment([corner(ux, 0.0, 0.0), corner(ux, 1.0, 0.0)], grid);
        }
    }
    for v in 0..surface.versions.len() {
        let [_, uy, _] = scene.unit(scene.x_min, v as f64, 0.0);
        painter.line_segment([corner(0.0, uy, 0.0), corner(1.0, uy, 0.0)], grid);
    }
}

fn draw_labels(painter: &egui::Painter, scene: &Scene, surface: &Surface, text_color: Color32) {
    let small = FontId::proportional(11.0);
    let title = FontId::proportional(14.0);
    let at = |p: [f32; 3]| scene.screen(p).0;

    for tick in &surface.x_ticks {
        let [ux, _, _] = scene.unit(tick.value, 0.0, 0.0);
        if (0.0..=1.0).contains(&ux) {
            painter.text(
                at([ux, -0.08, 0.0]),
                Align2::CENTER_CENTER,
                &tick.label,
                small.clone(),
                text_color,
            );
        }
    }
    for (v, label) in surface.versions.iter().enumerate() {
        let [_, uy, _] = scene.unit(scene.x_min, v as f64, 0.0);
        painter.text(at([1.08, uy, 0.0]), Align2::CENTER_CENTER, label, small.clone(), text_color);
    }
    for i in 0..=4 {
        let uz = i as f32 / 4.0;
        let value = scene.z_max * uz as f64;
        painter.text(
            at([-0.06, 1.0, uz]),
            Align2::RIGHT_CENTER,
            format!("{value:.2}"),
            small.clone(),
            text_color,
        );
    }

    let axis_titles = [
        ([0.5, -0.22, 0.0], Align2::CENTER_CENTER, &surface.x_label),
        ([1.22, 0.5, 0.0], Align2::CENTER_CENTER, &surface.y_label),
        ([-0.2, 1.0, 0.5], Align2::RIGHT_CENTER, &surface.z_label),
    ];
    for (anchor, align, label) in axis_titles {
        painter.text(at(anchor), align, label, title.clone(), text_color);
    }
}

fn draw_colorbar(
    painter: &egui::Painter,
    rect: Rect,
    z_max: f64,
    gradient: &Gradient,
    text_color: Color32,
) {
    const STEPS: usize = 64;
    let top = rect.top() + rect.height() * 0.25;
    let bottom = rect.bottom() - rect.height() * 0.25;
    let left = rect.right() - COLORBAR_STRIP + 16.0;
    let right = left + 18.0;
    let step = (bottom - top) / STEPS as f32;

    for i in 0..STEPS {
        let t = 1.0 - i as f64 / (STEPS - 1) as f64;
        let y0 = top + i as f32 * step;
        let cell = Rect::from_min_max(pos2(left, y0), pos2(right, y0 + step + 0.5));
        painter.rect_filled(cell, 0.0_f32, gradient.color32(t));
    }
    painter.add(Shape::closed_line(
        vec![pos2(left, top), pos2(right, top), pos2(right, bottom), pos2(left, bottom)],
        Stroke::new(1.0, text_color.gamma_multiply(0.5)),
    ));

    let font = FontId::proportional(11.0);
    for (y, value) in [(top, z_max), ((top + bottom) / 2.0, z_max / 2.0), (bottom, 0.0)] {
        painter.text(
            pos2(right + 6.0, y),
            Align2::LEFT_CENTER,
            format!("{value:.2}"),
            font.clone(),
            text_color,
        );
    }
}
