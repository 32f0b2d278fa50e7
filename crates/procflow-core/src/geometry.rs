//! Geometric primitives used by the layout engine and the diagram exporter.
//!
//! Diagram interchange coordinates are expressed with a top-left origin, so
//! [`Bounds`] stores its top-left corner together with its [`Size`] rather
//! than a center point.

/// A point in diagram space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Bounds {
    /// Creates bounds from a top-left corner and dimensions.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the left x-coordinate
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the top y-coordinate
    pub fn y(self) -> f32 {
        self.y
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the right x-coordinate (`x + width`)
    pub fn right(self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom y-coordinate (`y + height`)
    pub fn bottom(self) -> f32 {
        self.y + self.height
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns the midpoint of the left edge
    pub fn left_middle(self) -> Point {
        Point::new(self.x, self.center().y)
    }

    /// Returns the midpoint of the right edge
    pub fn right_middle(self) -> Point {
        Point::new(self.right(), self.center().y)
    }

    /// Returns the midpoint of the top edge
    pub fn top_middle(self) -> Point {
        Point::new(self.center().x, self.y)
    }

    /// Returns the midpoint of the bottom edge
    pub fn bottom_middle(self) -> Point {
        Point::new(self.center().x, self.bottom())
    }

    /// Returns a copy moved vertically so that its top edge sits at `y`.
    pub fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }

    /// Merges two bounds to create a larger bounds that contains both
    pub fn merge(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right - x, bottom - y)
    }

    /// Expands the bounds outward by the given insets.
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self::new(
            self.x - insets.left(),
            self.y - insets.top(),
            self.width + insets.horizontal_sum(),
            self.height + insets.vertical_sum(),
        )
    }
}

/// Represents spacing around an element (padding, margin, etc.)
/// with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Returns the top inset value
    pub fn top(self) -> f32 {
        self.top
    }

    /// Returns the right inset value
    pub fn right(self) -> f32 {
        self.right
    }

    /// Returns the bottom inset value
    pub fn bottom(self) -> f32 {
        self.bottom
    }

    /// Returns the left inset value
    pub fn left(self) -> f32 {
        self.left
    }

    /// Returns the sum of left and right insets
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Returns the sum of top and bottom insets
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_midpoint() {
        let midpoint = Point::new(0.0, 0.0).midpoint(Point::new(4.0, 6.0));
        assert_eq!(midpoint, Point::new(2.0, 3.0));
    }

    #[test]
    fn test_bounds_edges() {
        let bounds = Bounds::new(50.0, 150.0, 36.0, 36.0);

        assert_approx_eq!(f32, bounds.right(), 86.0);
        assert_approx_eq!(f32, bounds.bottom(), 186.0);
        assert_eq!(bounds.center(), Point::new(68.0, 168.0));
        assert_eq!(bounds.left_middle(), Point::new(50.0, 168.0));
        assert_eq!(bounds.right_middle(), Point::new(86.0, 168.0));
        assert_eq!(bounds.top_middle(), Point::new(68.0, 150.0));
        assert_eq!(bounds.bottom_middle(), Point::new(68.0, 186.0));
    }

    #[test]
    fn test_bounds_with_y_keeps_size() {
        let bounds = Bounds::new(10.0, 20.0, 100.0, 80.0).with_y(-5.0);

        assert_eq!(bounds.y(), -5.0);
        assert_eq!(bounds.x(), 10.0);
        assert_approx_eq!(f32, bounds.width(), 100.0);
        assert_approx_eq!(f32, bounds.height(), 80.0);
    }

    #[test]
    fn test_bounds_merge() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(20.0, -5.0, 10.0, 10.0);
        let merged = a.merge(&b);

        assert_eq!(merged, Bounds::new(0.0, -5.0, 30.0, 15.0));
    }

    #[test]
    fn test_bounds_add_padding() {
        let padded = Bounds::new(50.0, 50.0, 100.0, 80.0).add_padding(Insets::uniform(50.0));

        assert_eq!(padded, Bounds::new(0.0, 0.0, 200.0, 180.0));
    }

    #[test]
    fn test_insets_sums() {
        let insets = Insets::uniform(2.5);
        assert_approx_eq!(f32, insets.top(), 2.5);
        assert_approx_eq!(f32, insets.horizontal_sum(), 5.0);
        assert_approx_eq!(f32, insets.vertical_sum(), 5.0);
    }
}
