use crate::Segment;

pub const DEFAULT_COLOR: &str = "black";
pub const DEFAULT_WIDTH: u32 = 3;

/// Turns pointer drags on the drawing surface into line segments.
#[derive(Debug, Clone)]
pub struct Brush {
    color: String,
    width: u32,
    last: Option<(f32, f32)>,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            width: DEFAULT_WIDTH,
            last: None,
        }
    }
}

impl Brush {
    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width.max(1);
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pointer moved with the button held. The first drag only sets the anchor.
    pub fn drag(&mut self, x: f32, y: f32) -> Option<Segment> {
        let segment = self.last.map(|(x1, y1)| Segment {
            x1,
            y1,
            x2: x,
            y2: y,
            color: self.color.clone(),
            width: self.width,
        });
        self.last = Some((x, y));
        segment
    }

    /// Pointer released.
    pub fn release(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drags_chain_into_segments() {
        let mut brush = Brush::default();
        assert!(brush.drag(0.0, 0.0).is_none());
        let first = brush.drag(5.0, 5.0).unwrap();
        assert_eq!((first.x1, first.y1, first.x2, first.y2), (0.0, 0.0, 5.0, 5.0));
        assert_eq!((first.color.as_str(), first.width), ("black", 3));

        brush.set_color("#00ff00");
        brush.set_width(12);
        let second = brush.drag(7.0, 9.0).unwrap();
        assert_eq!((second.x1, second.y1), (5.0, 5.0));
        assert_eq!(second.color, "#00ff00");
        assert_eq!(second.width, 12);
    }

    #[test]
    fn release_breaks_the_line() {
        let mut brush = Brush::default();
        brush.drag(1.0, 1.0);
        brush.release();
        assert!(brush.drag(9.0, 9.0).is_none());
        assert!(brush.drag(10.0, 9.0).is_some());
    }
}
