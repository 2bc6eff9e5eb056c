use crate::point::PointF;

/// Axis-aligned rectangle over `f64` coordinates.
///
/// The empty rectangle (`RectF::EMPTY`) has inverted bounds so that
/// `united` with any valid rectangle returns the other operand.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RectF {
    pub min: PointF,
    pub max: PointF,
}

impl RectF {
    pub const EMPTY: RectF = RectF {
        min: PointF::new(f64::INFINITY, f64::INFINITY),
        max: PointF::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    pub const fn new(min: PointF, max: PointF) -> Self {
        RectF { min, max }
    }
}

impl Default for RectF {
    fn default() -> Self {
        RectF::EMPTY
    }
}

impl RectF {
    pub fn from_size(origin: PointF, width: f64, height: f64) -> Self {
        RectF {
            min: origin,
            max: PointF::new(origin.x + width, origin.y + height),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        self.width() * self.height()
    }

    pub fn center(&self) -> PointF {
        PointF::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn contains_point(&self, p: PointF) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &RectF) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }

    pub fn united(&self, other: &RectF) -> RectF {
        if !self.is_valid() {
            return *other;
        }
        if !other.is_valid() {
            return *self;
        }
        RectF {
            min: PointF::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: PointF::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn intersected(&self, other: &RectF) -> RectF {
        RectF {
            min: PointF::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: PointF::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        }
    }

    pub fn expand_to_include(&mut self, p: PointF) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Grows the rectangle by `d` on every side.
    pub fn adjusted(&self, d: f64) -> RectF {
        RectF {
            min: PointF::new(self.min.x - d, self.min.y - d),
            max: PointF::new(self.max.x + d, self.max.y + d),
        }
    }

    pub fn moved_center(&self, c: PointF) -> RectF {
        let half_w = self.width() * 0.5;
        let half_h = self.height() * 0.5;
        RectF {
            min: PointF::new(c.x - half_w, c.y - half_h),
            max: PointF::new(c.x + half_w, c.y + half_h),
        }
    }

    pub fn bounding_rect_of(points: &[PointF]) -> RectF {
        let mut r = RectF::EMPTY;
        for p in points {
            r.expand_to_include(*p);
        }
        r
    }
}
