/// Orthographic camera looking at the unit cube.
///
/// Model axes: `x` = time, `y` = version, `z` = value, each scaled to
/// `[0, 1]`. Angles are in degrees; azimuth turns around the vertical axis,
/// elevation tilts the camera up from the horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub elevation: f32,
    pub azimuth: f32,
}

impl Default for View {
    fn default() -> Self {
        View {
            elevation: 30.0,
            azimuth: 135.0,
        }
    }
}

/// A projected point: screen coordinates centred on the cube centre with
/// `y` pointing up, plus depth (larger = further from the viewer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl View {
    pub fn new(elevation: f32, azimuth: f32) -> Self {
        let mut view = View {
            elevation,
            azimuth,
        };
        view.normalize_angles();
        view
    }

    pub fn project(&self, [x, y, z]: [f32; 3]) -> Projected {
        let (sa, ca) = self.azimuth.to_radians().sin_cos();
        let (se, ce) = self.elevation.to_radians().sin_cos();
        let (x, y, z) = (x - 0.5, y - 0.5, z - 0.5);

        let across = x * ca - y * sa;
        let along = x * sa + y * ca;

        Projected {
            x: across,
            y: along * se + z * ce,
            depth: along * ce - z * se,
        }
    }

    /// Apply a mouse drag measured in degrees.
    pub fn rotate(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.azimuth += d_azimuth;
        self.elevation += d_elevation;
        self.normalize_angles();
    }

    fn normalize_angles(&mut self) {
        self.azimuth = self.azimuth.rem_euclid(360.0);
        self.elevation = self.elevation.clamp(-90.0, 90.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn side_view_shows_value_as_height() {
        let view = View::new(0.0, 0.0);
        let p = view.project([1.0, 0.5, 0.5]);
        assert!(close(p.x, 0.5) && close(p.y, 0.0));

        let top = view.project([0.5, 0.5, 1.0]);
        assert!(close(top.x, 0.0) && close(top.y, 0.5));
    }

    #[test]
    fn top_view_ignores_value() {
        let view = View::new(90.0, 0.0);
        let low = view.project([0.2, 0.7, 0.0]);
        let high = view.project([0.2, 0.7, 1.0]);
        assert!(close(low.x, high.x) && close(low.y, high.y));
        // Looking down, higher points are closer.
        assert!(high.depth < low.depth);
    }

    #[test]
    fn centre_projects_to_origin() {
        let p = View::default().project([0.5, 0.5, 0.5]);
        assert!(close(p.x, 0.0) && close(p.y, 0.0) && close(p.depth, 0.0));
    }

    #[test]
    fn rotation_wraps_and_clamps() {
        let mut view = View::new(30.0, 350.0);
        view.rotate(20.0, 80.0);
        assert!(close(view.azimuth, 10.0));
        assert_eq!(view.elevation, 90.0);

        view.rotate(-30.0, -200.0);
        assert!(close(view.azimuth, 340.0));
        assert_eq!(view.elevation, -90.0);
    }
}
