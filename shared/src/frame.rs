//! Video frame payloads.
//!
//! Frames are interleaved BGR byte arrays (rows x cols x 3) backed by
//! `ndarray`. The only rendering primitive the pipeline itself needs is a
//! rectangle outline for the tracking overlays; all other presentation is
//! the UI surface's job.

use ndarray::Array3;

use crate::bounding_box::BoundingBox;

/// A decoded video frame (rows x cols x BGR).
#[derive(Debug, Clone)]
pub struct Frame {
    data: Array3<u8>,
}

impl Frame {
    /// Create a black frame of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: Array3::zeros((height as usize, width as usize, 3)),
        }
    }

    /// Wrap an existing (rows x cols x 3) array.
    ///
    /// # Panics
    /// Panics if the innermost axis is not 3 channels wide.
    pub fn from_array(data: Array3<u8>) -> Self {
        assert_eq!(data.shape()[2], 3, "frames must have 3 channels");
        Self { data }
    }

    pub fn width(&self) -> u32 {
        self.data.shape()[1] as u32
    }

    pub fn height(&self) -> u32 {
        self.data.shape()[0] as u32
    }

    /// Borrow the raw pixel array.
    pub fn data(&self) -> &Array3<u8> {
        &self.data
    }

    /// Mutably borrow the raw pixel array.
    pub fn data_mut(&mut self) -> &mut Array3<u8> {
        &mut self.data
    }

    /// Read one pixel as (b, g, r). Out-of-bounds reads return black.
    pub fn pixel(&self, row: usize, col: usize) -> (u8, u8, u8) {
        if row >= self.height() as usize || col >= self.width() as usize {
            return (0, 0, 0);
        }
        (
            self.data[[row, col, 0]],
            self.data[[row, col, 1]],
            self.data[[row, col, 2]],
        )
    }

    fn put_pixel(&mut self, row: i64, col: i64, color: [u8; 3]) {
        if row < 0 || col < 0 {
            return;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.height() as usize || col >= self.width() as usize {
            return;
        }
        for (c, &v) in color.iter().enumerate() {
            self.data[[row, col, c]] = v;
        }
    }

    /// Draw a rectangle outline for `bbox`, clamped to the frame bounds.
    ///
    /// `thickness` grows inward and outward around the box edge.
    pub fn draw_box(&mut self, bbox: &BoundingBox, color: [u8; 3], thickness: u32) {
        let (x0, y0) = bbox.top_left_rounded();
        let (w, h) = bbox.size_rounded();
        let (x1, y1) = (x0 + w, y0 + h);
        let t = thickness.max(1) as i64;

        for offset in -(t / 2)..=(t / 2).max(0) {
            for x in x0..=x1 {
                self.put_pixel(y0 + offset, x, color);
                self.put_pixel(y1 + offset, x, color);
            }
            for y in y0..=y1 {
                self.put_pixel(y, x0 + offset, color);
                self.put_pixel(y, x1 + offset, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_dimensions() {
        let frame = Frame::new(64, 48);
        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.pixel(0, 0), (0, 0, 0));
    }

    #[test]
    fn test_draw_box_marks_edges() {
        let mut frame = Frame::new(32, 32);
        let bbox = BoundingBox::new(4.0, 4.0, 8.0, 8.0);
        frame.draw_box(&bbox, [255, 0, 255], 1);

        assert_eq!(frame.pixel(4, 4), (255, 0, 255));
        assert_eq!(frame.pixel(4, 12), (255, 0, 255));
        assert_eq!(frame.pixel(12, 8), (255, 0, 255));
        // Interior stays untouched.
        assert_eq!(frame.pixel(8, 8), (0, 0, 0));
    }

    #[test]
    fn test_draw_box_clamps_out_of_bounds() {
        let mut frame = Frame::new(16, 16);
        let bbox = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        frame.draw_box(&bbox, [0, 255, 0], 3);
        // No panic; the in-bounds part of the outline is drawn.
        assert_eq!(frame.pixel(10, 12), (0, 255, 0));
    }
}
