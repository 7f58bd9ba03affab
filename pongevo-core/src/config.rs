//! Simulation configuration

use serde::{Deserialize, Serialize};

/// Court, ball, paddle and match constants for the simulator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Court width
    pub width: f64,
    /// Court height
    pub height: f64,
    /// Points needed to win a match
    pub winning_score: u32,
    /// Ball radius
    pub ball_radius: f64,
    /// Launch speed after every serve
    pub ball_speed: f64,
    /// Speed multiplier applied on each paddle hit
    pub speedup: f64,
    /// Cap on ball speed after paddle hits
    pub max_ball_speed: f64,
    /// Launch angle range is [-max, +max] (radians)
    pub max_launch_angle: f64,
    /// Reflection angle range off a paddle is [-max, +max] (radians)
    pub max_bounce_angle: f64,
    pub paddle_width: f64,
    pub paddle_height: f64,
    /// Paddle movement per tick at full effort
    pub paddle_speed: f64,
    /// Distance of each paddle's center from its own side line
    pub paddle_offset: f64,
    /// Safety cap for `run_to_completion`
    pub max_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            winning_score: 5,
            ball_radius: 10.0,
            ball_speed: 5.0,
            speedup: 1.02,
            max_ball_speed: 15.0,
            max_launch_angle: std::f64::consts::FRAC_PI_4,
            max_bounce_angle: std::f64::consts::FRAC_PI_3,
            paddle_width: 10.0,
            paddle_height: 80.0,
            paddle_speed: 6.0,
            paddle_offset: 30.0,
            max_ticks: 10_000,
        }
    }
}

impl SimConfig {
    /// Set points needed to win
    pub fn with_winning_score(mut self, winning_score: u32) -> Self {
        self.winning_score = winning_score;
        self
    }

    /// Set the tick cap
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }

    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }
}
