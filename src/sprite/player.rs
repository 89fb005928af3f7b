use crate::engine::input::Direction;
use crate::engine::{DrawSink, ImageSource, Point, Rect};
use crate::sprite::AnimatedSprite;
use anyhow::Result;

/// One walk strip per facing direction
pub struct FacingImages<I> {
    pub up: I,
    pub left: I,
    pub down: I,
    pub right: I,
}

/// The walking character
/// - FOUR independent sprites, one per direction, each with its own frame
/// index and throttle, so turning never inherits a half finished cycle
/// - all four always share one position
pub struct Player<I> {
    // indexed by Direction::index()
    sprites: [AnimatedSprite<I>; 4],
    facing: Direction,
}

impl<I: ImageSource> Player<I> {
    pub fn new(
        images: FacingImages<I>,
        position: Point,
        frame_count: u8,
        frame_delay_ms: f64,
    ) -> Result<Self> {
        let FacingImages {
            up,
            left,
            down,
            right,
        } = images;
        let walk = |image: I| AnimatedSprite::new(image, position, frame_count, frame_delay_ms);
        Ok(Player {
            sprites: [walk(up)?, walk(left)?, walk(down)?, walk(right)?],
            facing: Direction::Down,
        })
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn position(&self) -> Point {
        self.active().position()
    }

    pub fn sprite(&self, direction: Direction) -> &AnimatedSprite<I> {
        &self.sprites[direction.index()]
    }

    pub fn active(&self) -> &AnimatedSprite<I> {
        self.sprite(self.facing)
    }

    pub fn bounding_box(&self) -> Rect {
        self.active().bounding_box()
    }

    /// Move every facing sprite together
    pub fn translate(&mut self, delta: Point) {
        for sprite in self.sprites.iter_mut() {
            sprite.set_position(sprite.position().translate(delta));
        }
    }

    pub fn face(&mut self, direction: Direction) {
        self.facing = direction;
    }

    /// Step the walk cycle of `direction`, facing is left alone
    pub fn advance_frame(&mut self, direction: Direction, now: f64) -> bool {
        self.sprites[direction.index()].advance_frame(now)
    }

    /// Face `direction` in the standing pose
    pub fn stand(&mut self, direction: Direction) {
        self.facing = direction;
        self.sprites[direction.index()].reset_frame();
    }

    pub fn draw(&self, sink: &impl DrawSink<I>) {
        self.active().draw(sink);
    }
}
