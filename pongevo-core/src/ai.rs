//! Trait-driven paddle AI

use crate::config::SimConfig;
use crate::game::{Ball, Paddle, Side};
use rand::Rng;
use rand_distr::StandardNormal;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Distance (px) at which the paddle moves at full effort; also the
/// dead-zone width at reaction_time = 0
const FULL_EFFORT_DISTANCE: f64 = 50.0;

/// Targeting noise std-dev at noise_tolerance = 1
const NOISE_SCALE: f64 = 30.0;

/// Ticks of vertical velocity folded into the target at anticipation = 1
const ANTICIPATION_TICKS: f64 = 10.0;

// ============================================================================
// AI
// ============================================================================

impl Paddle {
    /// Movement decision for this tick, in [-1, 1] (+ is down).
    ///
    /// Reads only the paddle's traits and the ball; noise is drawn from `rng`.
    pub fn ai_move<R: Rng>(&self, ball: &Ball, config: &SimConfig, rng: &mut R) -> f64 {
        let traits = &self.traits;

        let mut target_y = ball.y;

        if traits.prediction_depth > 0.0 {
            let predicted_y = self.predict_ball_y(ball, config);
            target_y = target_y * (1.0 - traits.prediction_depth)
                + predicted_y * traits.prediction_depth;
        }

        if traits.anticipation > 0.0 {
            target_y += ball.vy * ANTICIPATION_TICKS * traits.anticipation;
        }

        // Aggression: 0 holds the center, 1 commits to the target
        let center_y = config.center_y();
        target_y = target_y * traits.aggression + center_y * (1.0 - traits.aggression);

        if traits.noise_tolerance > 0.0 {
            let z: f64 = rng.sample(StandardNormal);
            target_y += z * NOISE_SCALE * traits.noise_tolerance;
        }

        let diff = target_y - self.y;

        // Lower reaction time means a wider dead zone
        let reaction_threshold = FULL_EFFORT_DISTANCE * (1.0 - traits.reaction_time);
        if diff.abs() < reaction_threshold {
            return 0.0;
        }

        let move_amount = (diff.abs() / FULL_EFFORT_DISTANCE).min(1.0) * traits.speed_scaling;
        if diff > 0.0 {
            move_amount
        } else {
            -move_amount
        }
    }

    /// Predict the ball's y when it next reaches this paddle's x.
    ///
    /// Straight-line extrapolation; a ball moving away is assumed to come
    /// back off the far side line. The result is mirror-folded into
    /// `[0, height]`.
    pub fn predict_ball_y(&self, ball: &Ball, config: &SimConfig) -> f64 {
        if ball.vx == 0.0 {
            return ball.y;
        }

        let speed_x = ball.vx.abs();
        let total_time = match self.side {
            Side::Left if ball.vx > 0.0 => {
                let time_to_wall = (config.width - ball.x) / speed_x;
                let time_back = (config.width - self.x) / speed_x;
                time_to_wall + time_back
            }
            Side::Left => (ball.x - self.x) / speed_x,
            Side::Right if ball.vx < 0.0 => {
                let time_to_wall = ball.x / speed_x;
                let time_back = self.x / speed_x;
                time_to_wall + time_back
            }
            Side::Right => (self.x - ball.x) / speed_x,
        };

        fold_into_court(ball.y + ball.vy * total_time, config.height)
    }
}

/// Reflect `y` off the top and bottom walls until it lies in `[0, height]`
pub fn fold_into_court(y: f64, height: f64) -> f64 {
    if !y.is_finite() || height <= 0.0 {
        return y.clamp(0.0, height.max(0.0));
    }
    let period = 2.0 * height;
    let folded = y.rem_euclid(period);
    if folded > height {
        period - folded
    } else {
        folded
    }
}
