//! Plain geometry values shared by attribute codecs and the view model.

/// A 2D point or size, in view coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal component
    pub x: f64,
    /// Vertical component
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle stored as its four edges.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    #[inline]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build a rectangle from its top-left corner and extent.
    #[inline]
    pub fn from_origin_size(origin: Point, size: Point) -> Self {
        Self::new(origin.x, origin.y, origin.x + size.x, origin.y + size.y)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    #[inline]
    pub fn size(&self) -> Point {
        Point::new(self.width(), self.height())
    }

    /// Move the rectangle so its top-left corner sits at `origin`, keeping its extent.
    #[inline]
    pub fn set_origin(&mut self, origin: Point) {
        let size = self.size();
        *self = Self::from_origin_size(origin, size);
    }

    /// Resize the rectangle from its top-left corner.
    #[inline]
    pub fn set_size(&mut self, size: Point) {
        self.right = self.left + size.x;
        self.bottom = self.top + size.y;
    }
}
