use crate::engine::throttle::Throttle;
use crate::engine::{DrawSink, ImageSource, Point, Rect, Size};
use anyhow::{ensure, Result};

/// A horizontal strip of equally wide frames, played left to right
///
/// TABLE:
/// ┌──────────┬──────────┬──────────┬──────────┐
/// │ frame 0  │ frame 1  │ frame 2  │ frame 3  │  <- one image
/// └──────────┴──────────┴──────────┴──────────┘
///  ◄─────────►
///  frame_width = image width / frame_count
#[derive(Debug, Clone)]
pub struct AnimatedSprite<I> {
    position: Point,
    image: I,
    frame_count: u8,
    active_frame: u8,
    // lives and dies with the sprite
    throttle: Throttle,
}

impl<I: ImageSource> AnimatedSprite<I> {
    /// # Errors
    /// * `frame_count` of 0 : there would be no frame to crop
    /// * negative or non finite `frame_delay_ms`
    pub fn new(image: I, position: Point, frame_count: u8, frame_delay_ms: f64) -> Result<Self> {
        ensure!(frame_count > 0, "AnimatedSprite needs at least one frame");
        ensure!(
            frame_delay_ms.is_finite() && frame_delay_ms >= 0.0,
            "AnimatedSprite frame delay must be a finite, non negative number of ms, got {}",
            frame_delay_ms
        );
        Ok(AnimatedSprite {
            position,
            image,
            frame_count,
            active_frame: 0,
            throttle: Throttle::new(frame_delay_ms),
        })
    }

    /// Single frame image, e.g. the map background
    pub fn still(image: I, position: Point) -> Self {
        AnimatedSprite {
            position,
            image,
            frame_count: 1,
            active_frame: 0,
            throttle: Throttle::new(0.0),
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn active_frame(&self) -> u8 {
        self.active_frame
    }

    pub fn frame_width(&self) -> f32 {
        self.image.size().width / f32::from(self.frame_count)
    }

    /// on screen size of ONE frame
    pub fn size(&self) -> Size {
        Size {
            width: self.frame_width(),
            height: self.image.size().height,
        }
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::new(self.position, self.size())
    }

    /// source crop of the active frame inside the strip
    pub fn frame_rect(&self) -> Rect {
        let size = self.size();
        Rect::new_from_x_y(
            f32::from(self.active_frame) * size.width,
            0.0,
            size.width,
            size.height,
        )
    }

    pub fn draw(&self, sink: &impl DrawSink<I>) {
        sink.draw_image(&self.image, &self.frame_rect(), &self.bounding_box());
    }

    /// Step the walk cycle, at most once per frame delay
    /// - returns whether the frame actually moved
    pub fn advance_frame(&mut self, now: f64) -> bool {
        let frame_count = self.frame_count;
        let active_frame = &mut self.active_frame;
        self.throttle.call(now, || {
            *active_frame = (*active_frame + 1) % frame_count;
        })
    }

    /// Back to the standing pose right away, ignores the throttle
    pub fn reset_frame(&mut self) {
        self.active_frame = 0;
    }
}
