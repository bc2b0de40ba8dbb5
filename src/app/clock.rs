use std::time::Instant;

/// Drives the broadcast-range pulse. The radius grows linearly from
/// `starting_radius` and restarts once it passes `max_radius`.
#[derive(Clone, Debug)]
pub(in crate::app) struct AnimationClock {
    started: Instant,
    starting_radius: f32,
    speed: f32,
    max_radius: f32,
}

impl AnimationClock {
    pub(in crate::app) fn new(starting_radius: f32, speed: f32, max_radius: f32) -> Self {
        Self::starting_at(Instant::now(), starting_radius, speed, max_radius)
    }

    pub(in crate::app) fn starting_at(
        started: Instant,
        starting_radius: f32,
        speed: f32,
        max_radius: f32,
    ) -> Self {
        Self {
            started,
            starting_radius: starting_radius.max(0.0),
            speed: speed.max(0.0),
            max_radius,
        }
    }

    pub(in crate::app) fn reset(&mut self, now: Instant) {
        self.started = now;
    }

    /// Radius for the frame drawn at `now`. Crossing the maximum resets the
    /// clock and yields the starting radius for this sample.
    pub(in crate::app) fn radius_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();
        let radius = self.starting_radius + self.speed * elapsed;
        if radius > self.max_radius {
            self.reset(now);
            return self.starting_radius;
        }
        radius
    }
}
